use std::path::PathBuf;

/// Path of the daemon's unix socket.
///
/// `UNID_SOCKET` overrides everything; otherwise the socket lives in
/// `XDG_RUNTIME_DIR`, falling back to `/tmp`.
pub fn socket_path() -> PathBuf {
    if let Ok(custom_path) = std::env::var("UNID_SOCKET") {
        return PathBuf::from(custom_path);
    }

    std::env::var("XDG_RUNTIME_DIR")
        .map(|dir| PathBuf::from(dir).join("unid.sock"))
        .unwrap_or_else(|_| PathBuf::from("/tmp/unid.sock"))
}

/// Path of the daemon's single-instance lock file, which also carries
/// the daemon PID.
pub fn lock_path() -> PathBuf {
    socket_path().with_extension("lock")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_path_derives_from_socket_path() {
        assert_eq!(lock_path(), socket_path().with_extension("lock"));
    }

    #[test]
    fn test_socket_path_has_file_name() {
        assert!(socket_path().file_name().is_some());
    }
}
