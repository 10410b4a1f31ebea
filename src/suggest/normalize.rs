/// Administrative unit suffixes that OCR'ed names may carry, e.g. "Edirne vilayeti"
pub const ADMIN_SUFFIXES: [&str; 13] = [
    " nahiyesi",
    " karyesi",
    " koyu",
    " kasabasi",
    " mahallesi",
    " ilcesi",
    " vilayeti",
    " sancagi",
    " sancak",
    " kazasi",
    " kaza",
    " sehri",
    " ceziresi",
];

/// Lowercases and folds Turkish letters to their plain ASCII counterparts
pub fn fold_turkish(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| match c {
            'û' | 'ü' => 'u',
            'ç' => 'c',
            'ö' => 'o',
            'î' | 'ı' => 'i',
            'â' => 'a',
            'ş' => 's',
            'ğ' => 'g',
            other => other,
        })
        .collect()
}

/// Splits off the first matching administrative suffix.
/// Returns `(stem, suffix)`, the suffix keeps its leading space.
pub fn strip_admin_suffix(name: &str) -> (&str, &'static str) {
    for suffix in ADMIN_SUFFIXES {
        if let Some(stem) = name.strip_suffix(suffix) {
            return (stem, suffix);
        }
    }
    (name, "")
}
