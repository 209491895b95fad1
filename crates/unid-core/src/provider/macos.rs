use std::io;
use std::process::Command;

use crate::DeviceIdentifier;
use crate::IdentityError;

pub fn read_platform_uuid() -> Result<Option<DeviceIdentifier>, IdentityError> {
    let output = match Command::new("ioreg")
        .args(["-rd1", "-c", "IOPlatformExpertDevice"])
        .output()
    {
        Ok(output) => output,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(IdentityError::Io(e)),
    };

    if !output.status.success() {
        return Ok(None);
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|e| IdentityError::SourceOutput(e.to_string()))?;
    Ok(parse_platform_uuid(&stdout))
}

/// Extracts the value from a line like `"IOPlatformUUID" = "XXXX-..."`.
fn parse_platform_uuid(ioreg_output: &str) -> Option<DeviceIdentifier> {
    for line in ioreg_output.lines() {
        if !line.contains("IOPlatformUUID") {
            continue;
        }
        let value = line.split('=').nth(1)?.trim().trim_matches('"');
        return DeviceIdentifier::new(value);
    }
    None
}
