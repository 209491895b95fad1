use std::io;
use std::path::Path;

use crate::DeviceIdentifier;
use crate::IdentityError;

// systemd writes /etc/machine-id; older distros may only carry the
// D-Bus copy.
const MACHINE_ID_PATHS: [&str; 2] = ["/etc/machine-id", "/var/lib/dbus/machine-id"];

pub fn read_machine_id() -> Result<Option<DeviceIdentifier>, IdentityError> {
    for path in MACHINE_ID_PATHS {
        if let Some(id) = read_id_file(Path::new(path))? {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

fn read_id_file(path: &Path) -> Result<Option<DeviceIdentifier>, IdentityError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(DeviceIdentifier::new(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(IdentityError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_id_file_trims_trailing_newline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "9f2a77b4c1d84e01a6f3b2c9d8e7f605").unwrap();

        let id = read_id_file(file.path()).unwrap().unwrap();
        assert_eq!(id.as_str(), "9f2a77b4c1d84e01a6f3b2c9d8e7f605");
    }

    #[test]
    fn test_read_id_file_empty_is_absent() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(read_id_file(file.path()).unwrap().is_none());
    }

    #[test]
    fn test_read_id_file_whitespace_only_is_absent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();
        assert!(read_id_file(file.path()).unwrap().is_none());
    }

    #[test]
    fn test_read_id_file_missing_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-file");
        assert!(read_id_file(&path).unwrap().is_none());
    }
}
