//! Accessibility trust checks.
//!
//! Moving another process's notification banners requires the macOS
//! Accessibility permission. This crate exposes the raw OS primitive and
//! nothing else: polling, change detection and restart logic live in the
//! core's permission gate.
//!
//! - [`accessibility_ok`] is fast and side-effect free.
//! - [`request_accessibility`] additionally asks the OS to show its one-time
//!   "grant access" prompt when the process is not yet trusted.
//!
//! On hosts other than macOS both functions report `false`.

#[cfg(target_os = "macos")]
mod sys {
    use core_foundation::{
        base::TCFType,
        boolean::CFBoolean,
        dictionary::{CFDictionary, CFDictionaryRef},
        string::{CFString, CFStringRef},
    };

    #[link(name = "ApplicationServices", kind = "framework")]
    unsafe extern "C" {
        fn AXIsProcessTrusted() -> bool;
        fn AXIsProcessTrustedWithOptions(options: CFDictionaryRef) -> bool;
        static kAXTrustedCheckOptionPrompt: CFStringRef;
    }

    pub(crate) fn trusted() -> bool {
        unsafe { AXIsProcessTrusted() }
    }

    pub(crate) fn trusted_with_prompt() -> bool {
        let key = unsafe { CFString::wrap_under_get_rule(kAXTrustedCheckOptionPrompt) };
        let opts: CFDictionary<CFString, CFBoolean> =
            CFDictionary::from_CFType_pairs(&[(key, CFBoolean::true_value())]);
        unsafe { AXIsProcessTrustedWithOptions(opts.as_concrete_TypeRef()) }
    }
}

/// Check whether the process holds the Accessibility permission.
pub fn accessibility_ok() -> bool {
    #[cfg(target_os = "macos")]
    {
        sys::trusted()
    }
    #[cfg(not(target_os = "macos"))]
    {
        false
    }
}

/// Check the Accessibility permission, asking the OS to prompt the user if it is missing.
///
/// The prompt is shown at most once per process by the OS; later calls behave
/// like [`accessibility_ok`].
pub fn request_accessibility() -> bool {
    #[cfg(target_os = "macos")]
    {
        sys::trusted_with_prompt()
    }
    #[cfg(not(target_os = "macos"))]
    {
        false
    }
}
