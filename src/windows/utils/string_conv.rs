//! String conversion utilities for Windows API

/// Convert a Rust string to a null-terminated wide string (UTF-16)
pub fn string_to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Convert a Windows wide string (UTF-16) to a Rust string, stopping at the first null
pub fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..len])
}

/// Extract filename from full path
pub fn extract_filename(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or(path)
}
