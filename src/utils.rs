/// Pull a reference digest out of pasted text or a checksum file.
///
/// Accepted shapes, first non-empty line wins:
/// - a bare digest
/// - `<digest>  <file name>` (coreutils `*sum` output)
/// - `SHA256 (file name) = <digest>` (BSD style)
pub fn parse_first_hash_from_text(s: &str) -> Option<String> {
    let line = s.lines().map(str::trim).find(|l| !l.is_empty())?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if let [only] = tokens.as_slice() {
        return Some(only.to_string());
    }
    tokens
        .iter()
        .map(|t| t.trim_start_matches('*'))
        .find(|t| t.len() >= 16 && t.chars().all(|c| c.is_ascii_hexdigit()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_digest() {
        assert_eq!(
            parse_first_hash_from_text("\n  d41d8cd98f00b204e9800998ecf8427e \n"),
            Some("d41d8cd98f00b204e9800998ecf8427e".to_string())
        );
    }

    #[test]
    fn coreutils_line() {
        let text = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855  empty.iso\n\
                    ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad  abc.txt";
        assert_eq!(
            parse_first_hash_from_text(text).as_deref(),
            Some("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn bsd_line() {
        let text = "MD5 (abc.txt) = 900150983cd24fb0d6963f7d28e17f72";
        assert_eq!(
            parse_first_hash_from_text(text).as_deref(),
            Some("900150983cd24fb0d6963f7d28e17f72")
        );
    }

    #[test]
    fn nothing_hex_like() {
        assert_eq!(parse_first_hash_from_text("see attached file"), None);
        assert_eq!(parse_first_hash_from_text("   \n\n"), None);
    }
}
