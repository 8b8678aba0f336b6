//! Naming of the threads spawned by this crate.

use tracing::warn;

/// Sets the name of the current thread.
///
/// Linux truncates names to 15 bytes. Names containing a NUL byte are
/// rejected with a warning and the thread keeps its previous name.
pub fn set_thread_name(name: &str) {
    #[cfg(target_family = "unix")]
    set_thread_name_unix(name);

    #[cfg(target_os = "windows")]
    set_thread_name_windows(name);

    #[cfg(not(any(target_family = "unix", target_os = "windows")))]
    {
        let _ = name;
    }
}

#[cfg(target_family = "unix")]
fn set_thread_name_unix(name: &str) {
    use std::ffi::CString;

    // pthread names are limited to 16 bytes including the terminator on Linux.
    let truncated: String = name.chars().take(15).collect();
    let cname = match CString::new(truncated) {
        Ok(cname) => cname,
        Err(err) => {
            warn!("invalid thread name {name:?}: {err}");
            return;
        }
    };

    // SAFETY: `cname` is a valid NUL-terminated string that outlives the call,
    // and the target is the calling thread.
    unsafe {
        #[cfg(target_vendor = "apple")]
        libc::pthread_setname_np(cname.as_ptr());
        #[cfg(not(target_vendor = "apple"))]
        libc::pthread_setname_np(libc::pthread_self(), cname.as_ptr());
    }
}

#[cfg(target_os = "windows")]
fn set_thread_name_windows(name: &str) {
    use std::{ffi::OsStr, os::windows::ffi::OsStrExt};

    let name_wide: Vec<u16> = OsStr::new(name)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    // SAFETY: `name_wide` is NUL-terminated UTF-16 and outlives the call.
    unsafe {
        use windows::{
            Win32::System::Threading::{GetCurrentThread, SetThreadDescription},
            core::PCWSTR,
        };

        let _ = SetThreadDescription(GetCurrentThread(), PCWSTR(name_wide.as_ptr()));
    }
}
