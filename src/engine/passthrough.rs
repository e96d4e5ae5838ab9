//! Daemon-socket passthrough resolution.
//!
//! Forwarding the host's container-daemon control socket into the container
//! lets nested daemon operations target the host daemon. Only `unix` socket
//! addresses are supported; the address is split on its scheme prefix and
//! nothing further of the URL is interpreted.
//!
//! The socket mount maps the canonical host path to the literal socket path
//! inside the container. When the socket is owned by a different user than
//! the configured uid, the container user joins the socket's owning group —
//! provided the socket is group-writable and the group is not gid 0.

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{ConfigError, FilesystemError, Result};

/// Socket forwarding derived from the daemon address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketPassthrough {
    /// Canonical host socket path, the mount source.
    pub host_path: Utf8PathBuf,
    /// Literal socket path, the mount target inside the container.
    pub container_path: Utf8PathBuf,
    /// Owning gid the container user must join, when the socket belongs to a
    /// different user.
    pub extra_group: Option<u32>,
}

/// Resolve the daemon address into a socket passthrough.
///
/// # Errors
///
/// Returns `ConfigError::UnsupportedSocketScheme` for any scheme other than
/// `unix` (including an address with no scheme at all),
/// `FilesystemError::NotFound`/`Io` when the socket cannot be resolved or
/// inspected, and `ConfigError::SocketNotGroupWritable`/`SocketGroupRoot`
/// when group membership cannot grant access safely.
pub fn resolve_passthrough(docker_host: &str, uid: u32) -> Result<SocketPassthrough> {
    let (scheme, socket_path) = split_scheme(docker_host);
    if scheme != "unix" {
        return Err(ConfigError::UnsupportedSocketScheme {
            scheme: scheme.to_owned(),
        }
        .into());
    }

    let container_path = Utf8PathBuf::from(socket_path);
    let host_path = container_path.canonicalize_utf8().map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            FilesystemError::NotFound {
                path: container_path.clone(),
            }
        } else {
            FilesystemError::Io {
                path: container_path.clone(),
                message: error.to_string(),
            }
        }
    })?;

    let extra_group = socket_group(&host_path, uid)?;

    Ok(SocketPassthrough {
        host_path,
        container_path,
        extra_group,
    })
}

/// Split an address into scheme and remainder; an address with no `://`
/// separator has the empty scheme.
fn split_scheme(address: &str) -> (&str, &str) {
    address.split_once("://").unwrap_or(("", address))
}

/// Derive the supplementary group needed to write to the socket.
#[cfg(unix)]
fn socket_group(path: &Utf8Path, uid: u32) -> Result<Option<u32>> {
    use std::os::unix::fs::MetadataExt;

    let metadata = std::fs::metadata(path).map_err(|error| FilesystemError::Io {
        path: path.to_owned(),
        message: error.to_string(),
    })?;

    if metadata.uid() == uid {
        return Ok(None);
    }
    if metadata.mode() & 0o060 != 0o060 {
        return Err(ConfigError::SocketNotGroupWritable {
            path: path.to_owned(),
        }
        .into());
    }
    if metadata.gid() == 0 {
        return Err(ConfigError::SocketGroupRoot {
            path: path.to_owned(),
        }
        .into());
    }
    Ok(Some(metadata.gid()))
}

/// Socket group inspection is unix-only; other platforms cannot pass a unix
/// socket through.
#[cfg(not(unix))]
fn socket_group(_path: &Utf8Path, _uid: u32) -> Result<Option<u32>> {
    Err(ConfigError::UnsupportedSocketScheme {
        scheme: String::from("unix"),
    }
    .into())
}
