use winreg::RegKey;
use winreg::enums::HKEY_LOCAL_MACHINE;

use crate::DeviceIdentifier;
use crate::IdentityError;

pub fn read_machine_guid() -> Result<Option<DeviceIdentifier>, IdentityError> {
    let key = match RegKey::predef(HKEY_LOCAL_MACHINE)
        .open_subkey(r"SOFTWARE\Microsoft\Cryptography")
    {
        Ok(key) => key,
        Err(_) => return Ok(None),
    };

    let guid: String = match key.get_value("MachineGuid") {
        Ok(guid) => guid,
        Err(_) => return Ok(None),
    };

    Ok(DeviceIdentifier::new(guid))
}
