use serde_json::json;

use unid_common::ValueExt;
use unid_core::IdentityProvider;
use unid_core::OsIdentityProvider;
use unid_ipc::ClientError;
use unid_ipc::DaemonClient;
use unid_ipc::StopResult;
use unid_ipc::UnixSocketClient;
use unid_ipc::read_daemon_pid;
use unid_ipc::stop_daemon;

/// Asks the daemon for the device identifier.
pub fn handle_id<C: DaemonClient>(client: &mut C, json_output: bool) -> Result<String, ClientError> {
    let result = client.call("getUnixId", None)?;
    if json_output {
        Ok(result.to_string())
    } else {
        Ok(result.str_or("unix_id", "(none)"))
    }
}

/// Reads the device identifier in-process, without a daemon.
pub fn handle_local_id(json_output: bool) -> Result<String, unid_core::IdentityError> {
    let id = OsIdentityProvider::new()
        .unix_id()?
        .map(|id| id.into_string());

    if json_output {
        Ok(json!({ "unix_id": id }).to_string())
    } else {
        Ok(id.unwrap_or_else(|| "(none)".to_string()))
    }
}

pub fn handle_status(json_output: bool) -> String {
    let running = UnixSocketClient::is_daemon_running();
    let pid = read_daemon_pid();

    if json_output {
        return json!({ "running": running, "pid": pid }).to_string();
    }

    match (running, pid) {
        (true, Some(pid)) => format!("Daemon running (pid {})", pid),
        (true, None) => "Daemon running".to_string(),
        (false, _) => "Daemon not running".to_string(),
    }
}

pub fn handle_stop(json_output: bool) -> Result<String, ClientError> {
    match stop_daemon()? {
        StopResult::Stopped { pid } => {
            if json_output {
                Ok(json!({ "stopped": true, "pid": pid }).to_string())
            } else {
                Ok(format!("Stopped daemon (pid {})", pid))
            }
        }
        StopResult::NotRunning => {
            if json_output {
                Ok(json!({ "stopped": false, "pid": null }).to_string())
            } else {
                Ok("Daemon not running".to_string())
            }
        }
    }
}
