/// Split a datastring into ordered chunks of at most `max_len` bytes.
///
/// The datastring is ASCII (base64 output), so byte-wise splitting never cuts a
/// character. Produces `ceil(len / max_len)` chunks; the last one carries the
/// remainder.
pub fn split_into_chunks(datastring: &str, max_len: usize) -> Vec<String> {
    datastring
        .as_bytes()
        .chunks(max_len)
        .map(|piece| String::from_utf8_lossy(piece).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_empty() {
        let chunks = split_into_chunks("", 5);
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_split_shorter_than_max() {
        let chunks = split_into_chunks("abc", 5);
        assert_eq!(chunks, vec!["abc"]);
    }

    #[test]
    fn test_split_exact_boundary() {
        let chunks = split_into_chunks("abcde", 5);
        assert_eq!(chunks, vec!["abcde"]);
    }

    #[test]
    fn test_split_with_remainder() {
        // The worked example: 11 bytes at capacity 5.
        let chunks = split_into_chunks("HELLO_WORLD", 5);
        assert_eq!(chunks, vec!["HELLO", "_WORL", "D"]);
    }

    #[test]
    fn test_chunk_count_matches_ceil() {
        for len in [1usize, 9, 10, 11, 99, 100, 101] {
            let datastring = "x".repeat(len);
            let chunks = split_into_chunks(&datastring, 10);
            assert_eq!(chunks.len(), len.div_ceil(10), "len={len}");
            let rejoined: String = chunks.concat();
            assert_eq!(rejoined, datastring);
        }
    }
}
