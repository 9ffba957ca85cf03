use crate::scanner::{AcceptedFile, SkipReason};
use crate::source::FileNode;

/// Files at or above this size are rejected, before reading when the reported size
/// already exceeds it and again on the bytes actually read.
pub const MAX_FILE_BYTES: u64 = 2 * 1024 * 1024; // 2 MiB

/// Read one file as text.
///
/// `path` is the relative path the caller wants recorded. Binary detection is a NUL
/// check on the decoded text: formats that avoid NUL bytes slip through, which is an
/// accepted limitation of the heuristic.
pub async fn load<F: FileNode>(file: &F, path: &str) -> Result<AcceptedFile, SkipReason> {
    let size = match file.size().await {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(path, error = %e, "stat failed");
            return Err(SkipReason::ReadError);
        }
    };
    if size >= MAX_FILE_BYTES {
        return Err(SkipReason::TooLarge);
    }

    let bytes = match file.read_bytes().await {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(path, error = %e, "read failed");
            return Err(SkipReason::ReadError);
        }
    };
    // The file may have grown since it was stat'ed.
    let size = bytes.len() as u64;
    if size >= MAX_FILE_BYTES {
        return Err(SkipReason::TooLarge);
    }
    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };

    if content.contains('\0') {
        return Err(SkipReason::BinaryDetected);
    }

    Ok(AcceptedFile {
        path: path.to_string(),
        content,
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::MemFile;

    #[tokio::test]
    async fn accepts_text_and_keeps_byte_size() {
        let f = MemFile::new("readme.md", "héllo");
        let got = load(&f, "docs/readme.md").await.unwrap();
        assert_eq!(got.path, "docs/readme.md");
        assert_eq!(got.content, "héllo");
        // 'é' is two bytes in UTF-8
        assert_eq!(got.size, 6);
        assert_eq!(got.content.chars().count(), 5);
    }

    #[tokio::test]
    async fn size_ceiling_is_exclusive() {
        let just_under = MemFile::new("a.txt", vec![b'a'; (MAX_FILE_BYTES - 1) as usize]);
        assert!(load(&just_under, "a.txt").await.is_ok());

        let at_limit = MemFile::new("b.txt", vec![b'a'; MAX_FILE_BYTES as usize]);
        assert_eq!(load(&at_limit, "b.txt").await, Err(SkipReason::TooLarge));
        assert_eq!(at_limit.read_count(), 0, "oversized files must not be read");
    }

    #[tokio::test]
    async fn ceiling_applies_to_bytes_actually_read() {
        let grown = MemFile::new("grown.log", vec![b'a'; MAX_FILE_BYTES as usize]).reported_size(10);
        assert_eq!(load(&grown, "grown.log").await, Err(SkipReason::TooLarge));
        assert_eq!(grown.read_count(), 1);
    }

    #[tokio::test]
    async fn nul_byte_marks_binary() {
        let f = MemFile::new("blob.dat", vec![b'G', b'I', 0, b'F']);
        assert_eq!(load(&f, "blob.dat").await, Err(SkipReason::BinaryDetected));
    }

    #[tokio::test]
    async fn invalid_utf8_is_decoded_lossily() {
        let f = MemFile::new("latin1.txt", vec![b'c', b'a', b'f', 0xE9]);
        let got = load(&f, "latin1.txt").await.unwrap();
        assert_eq!(got.content, "caf\u{FFFD}");
        assert_eq!(got.size, 4);
    }

    #[tokio::test]
    async fn io_failure_is_read_error() {
        let f = MemFile::new("secret.txt", "x").unreadable();
        assert_eq!(load(&f, "secret.txt").await, Err(SkipReason::ReadError));
    }
}
