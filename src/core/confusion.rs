// File: src/core/confusion.rs
//! Static tuning data for the weighted distance and the learning loop.
//!
//! Lookups are directional: `b` lists `h` as a visual confusion but `h` has no
//! entry at all. Keep the tables asymmetric.

use crate::core::types::AdaptiveWeights;

/// Shape-similar letters (mirrored or rotated forms).
const VISUAL: &[(char, &[char])] = &[
    ('b', &['d', 'p', 'q', 'h']),
    ('d', &['b', 'p', 'q', 'g']),
    ('p', &['q', 'b', 'd']),
    ('q', &['p', 'b', 'd']),
    ('m', &['w', 'n']),
    ('w', &['m', 'v']),
    ('n', &['u', 'h', 'r']),
    ('u', &['n', 'v']),
    ('f', &['t', 'j']),
    ('t', &['f', 'j']),
    ('l', &['i', '1']),
    ('i', &['l', 'j']),
];

/// Sound-similar letters.
const PHONETIC: &[(char, &[char])] = &[
    ('f', &['v']),
    ('v', &['f']),
    ('s', &['z', 'c']),
    ('z', &['s']),
    ('k', &['c', 'q']),
    ('c', &['k', 's']),
    ('j', &['g']),
    ('g', &['j']),
];

const VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u', 'y'];

/// The letters whose corrections feed `visual_substitution` and the
/// font recommendation.
pub const VISUAL_QUARTET: [char; 4] = ['b', 'd', 'p', 'q'];

pub const DEFAULT_WEIGHTS: AdaptiveWeights = AdaptiveWeights {
    visual_substitution: 1.0,
    phonetic_swap: 1.0,
    vowel_error: 1.0,
    transposition: 1.0,
};

/// Amount added to `visual_substitution` for each learned b/d/p/q swap.
pub const VISUAL_WEIGHT_STEP: f32 = 0.1;

/// Substitution costs used by the distance engine.
pub mod cost {
    pub const VISUAL: f32 = 0.4;
    pub const PHONETIC: f32 = 0.6;
    pub const VOWEL: f32 = 0.7;
    pub const DEFAULT: f32 = 1.0;
    pub const INDEL: f32 = 1.0;
    pub const TRANSPOSITION: f32 = 0.5;
}

fn find_in(table: &[(char, &'static [char])], from: char) -> &'static [char] {
    table
        .iter()
        .find(|(key, _)| *key == from)
        .map(|(_, set)| *set)
        .unwrap_or(&[])
}

pub fn is_visual_confusion(from: char, to: char) -> bool {
    find_in(VISUAL, from).contains(&to)
}

pub fn is_phonetic_confusion(from: char, to: char) -> bool {
    find_in(PHONETIC, from).contains(&to)
}

pub fn is_vowel(c: char) -> bool {
    VOWELS.contains(&c)
}

pub fn in_visual_quartet(c: char) -> bool {
    VISUAL_QUARTET.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visual_lookup_is_directional() {
        assert!(is_visual_confusion('b', 'h'));
        assert!(!is_visual_confusion('h', 'b'));
        assert!(is_visual_confusion('d', 'g'));
        assert!(!is_visual_confusion('g', 'd'));
    }

    #[test]
    fn phonetic_lookup_is_directional() {
        assert!(is_phonetic_confusion('c', 's'));
        assert!(is_phonetic_confusion('k', 'q'));
        assert!(!is_phonetic_confusion('q', 'k'));
    }

    #[test]
    fn categories_are_kept_apart() {
        // f -> t is visual only, f -> v is phonetic only.
        assert!(is_visual_confusion('f', 't'));
        assert!(!is_phonetic_confusion('f', 't'));
        assert!(is_phonetic_confusion('f', 'v'));
        assert!(!is_visual_confusion('f', 'v'));
    }

    #[test]
    fn vowel_set_includes_y() {
        assert!("aeiouy".chars().all(is_vowel));
        assert!(!is_vowel('b'));
    }
}
