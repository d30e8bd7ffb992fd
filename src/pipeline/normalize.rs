//! Alternate spellings of compound names.
//!
//! Chemical names often carry Greek letters (`α-Tocopherol`, `β-Carotene`)
//! that the identifier service only knows in spelled-out form. The normalizer
//! produces the ordered list of spellings the resolver should try.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static GREEK_LETTERS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    let pairs: [(char, char, &str); 24] = [
        ('α', 'Α', "alpha"),
        ('β', 'Β', "beta"),
        ('γ', 'Γ', "gamma"),
        ('δ', 'Δ', "delta"),
        ('ε', 'Ε', "epsilon"),
        ('ζ', 'Ζ', "zeta"),
        ('η', 'Η', "eta"),
        ('θ', 'Θ', "theta"),
        ('ι', 'Ι', "iota"),
        ('κ', 'Κ', "kappa"),
        ('λ', 'Λ', "lambda"),
        ('μ', 'Μ', "mu"),
        ('ν', 'Ν', "nu"),
        ('ξ', 'Ξ', "xi"),
        ('ο', 'Ο', "omicron"),
        ('π', 'Π', "pi"),
        ('ρ', 'Ρ', "rho"),
        ('σ', 'Σ', "sigma"),
        ('τ', 'Τ', "tau"),
        ('υ', 'Υ', "upsilon"),
        ('φ', 'Φ', "phi"),
        ('χ', 'Χ', "chi"),
        ('ψ', 'Ψ', "psi"),
        ('ω', 'Ω', "omega"),
    ];

    let mut map = HashMap::with_capacity(pairs.len() * 2 + 2);
    for (lower, upper, ascii) in pairs {
        map.insert(lower, ascii);
        map.insert(upper, ascii);
    }
    map.insert('ς', "sigma");
    // micro sign, distinct code point from Greek mu
    map.insert('\u{00B5}', "mu");
    map
});

/// Replace every known Greek letter with its ASCII name. Other characters pass through.
pub fn spell_out_greek(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 8);
    for ch in name.chars() {
        match GREEK_LETTERS.get(&ch) {
            Some(ascii) => out.push_str(ascii),
            None => out.push(ch),
        }
    }
    out
}

/// Ordered, de-duplicated spellings to try for `raw_name`.
///
/// The trimmed original always comes first. The result is never empty, even
/// for a blank name; callers are expected to reject blank names earlier.
pub fn name_candidates(raw_name: &str) -> Vec<String> {
    let original = raw_name.trim().to_string();
    let variant = spell_out_greek(&original);

    let mut candidates = vec![original];
    if !candidates.contains(&variant) {
        candidates.push(variant);
    }
    candidates
}
