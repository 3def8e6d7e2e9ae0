use std::{cell::RefCell, collections::HashMap, ffi::c_void, ptr, thread_local};

use core_foundation::{
    array::{CFArray, CFArrayGetCount, CFArrayGetValueAtIndex},
    base::{CFRelease, CFRetain, CFTypeRef, TCFType},
    string::{CFString, CFStringRef},
};
use core_graphics::geometry::{CGPoint, CGSize};
use notimove_core::AxError;

use crate::cfutil::{is_array, is_string};

#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {
    fn AXUIElementCreateApplication(pid: i32) -> *mut c_void;
    fn AXUIElementCreateSystemWide() -> *mut c_void;
    fn AXUIElementCopyAttributeValue(
        element: *mut c_void,
        attr: CFStringRef,
        value: *mut CFTypeRef,
    ) -> i32;
    fn AXUIElementSetAttributeValue(element: *mut c_void, attr: CFStringRef, value: CFTypeRef)
    -> i32;
    fn AXUIElementIsAttributeSettable(
        element: *mut c_void,
        attr: CFStringRef,
        settable: *mut u8,
    ) -> i32;
    fn AXUIElementSetMessagingTimeout(element: *mut c_void, seconds: f32) -> i32;

    fn AXValueCreate(the_type: i32, value_ptr: *const c_void) -> CFTypeRef;
    fn AXValueGetValue(the_value: CFTypeRef, the_type: i32, value_ptr: *mut c_void) -> bool;
}

// AXValue type constants
const K_AX_VALUE_CGPOINT_TYPE: i32 = 1;
const K_AX_VALUE_CGSIZE_TYPE: i32 = 2;
// Stale element (window closed)
const K_AX_ERROR_INVALID_UI_ELEMENT: i32 = -25202;
// Attribute not present on this element
const K_AX_ERROR_ATTRIBUTE_UNSUPPORTED: i32 = -25205;
const K_AX_ERROR_NO_VALUE: i32 = -25212;

pub(crate) const AX_POSITION: &str = "AXPosition";
pub(crate) const AX_SIZE: &str = "AXSize";
pub(crate) const AX_ROLE: &str = "AXRole";
pub(crate) const AX_SUBROLE: &str = "AXSubrole";
pub(crate) const AX_IDENTIFIER: &str = "AXIdentifier";
pub(crate) const AX_CHILDREN: &str = "AXChildren";
pub(crate) const AX_WINDOWS: &str = "AXWindows";

thread_local! {
    static ATTR_STRINGS: RefCell<HashMap<&'static str, CFString>> = RefCell::new(HashMap::new());
}

/// Stable CFStringRef for an attribute name, cached per thread.
pub(crate) fn cfstr(name: &'static str) -> CFStringRef {
    ATTR_STRINGS.with(|cell| {
        let mut m = cell.borrow_mut();
        let s = m.entry(name).or_insert_with(|| CFString::new(name));
        s.as_concrete_TypeRef()
    })
}

fn map_err(code: i32) -> AxError {
    match code {
        K_AX_ERROR_INVALID_UI_ELEMENT => AxError::Gone,
        K_AX_ERROR_ATTRIBUTE_UNSUPPORTED | K_AX_ERROR_NO_VALUE => AxError::Unsupported,
        c => AxError::Code(c),
    }
}

/// Retained AX element reference, released on drop.
#[derive(Debug)]
pub(crate) struct AXElem(*mut c_void);

// AXUIElementRef is a CFType: retain/release are thread-safe and AX calls may be
// issued from any thread.
unsafe impl Send for AXElem {}
unsafe impl Sync for AXElem {}

impl AXElem {
    /// Take ownership of a +1 reference. `None` for null.
    pub(crate) fn from_create(ptr: *mut c_void) -> Option<Self> {
        (!ptr.is_null()).then_some(Self(ptr))
    }

    /// Retain a borrowed reference. `None` for null.
    pub(crate) fn retain_from_borrowed(ptr: *mut c_void) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }
        unsafe { CFRetain(ptr as CFTypeRef) };
        Some(Self(ptr))
    }

    pub(crate) fn as_ptr(&self) -> *mut c_void {
        self.0
    }
}

impl Drop for AXElem {
    fn drop(&mut self) {
        unsafe { CFRelease(self.0 as CFTypeRef) };
    }
}

/// Application element for `pid`.
pub(crate) fn app_element(pid: i32) -> Option<AXElem> {
    AXElem::from_create(unsafe { AXUIElementCreateApplication(pid) })
}

/// Bound every AX call made by this process to `seconds`.
pub(crate) fn set_global_messaging_timeout(seconds: f32) -> Result<(), AxError> {
    let sys = AXElem::from_create(unsafe { AXUIElementCreateSystemWide() })
        .ok_or(AxError::Unsupported)?;
    let err = unsafe { AXUIElementSetMessagingTimeout(sys.as_ptr(), seconds) };
    if err != 0 {
        return Err(map_err(err));
    }
    Ok(())
}

fn copy_attr(element: *mut c_void, attr: CFStringRef) -> Result<CFTypeRef, AxError> {
    let mut v: CFTypeRef = ptr::null_mut();
    let err = unsafe { AXUIElementCopyAttributeValue(element, attr, &mut v) };
    if err != 0 {
        return Err(map_err(err));
    }
    if v.is_null() {
        return Err(AxError::Unsupported);
    }
    Ok(v)
}

pub(crate) fn ax_get_point(element: *mut c_void, attr: CFStringRef) -> Result<CGPoint, AxError> {
    let v = copy_attr(element, attr)?;
    let mut p = CGPoint::new(0.0, 0.0);
    let ok = unsafe { AXValueGetValue(v, K_AX_VALUE_CGPOINT_TYPE, (&raw mut p).cast()) };
    unsafe { CFRelease(v) };
    if !ok {
        return Err(AxError::Unsupported);
    }
    Ok(p)
}

pub(crate) fn ax_get_size(element: *mut c_void, attr: CFStringRef) -> Result<CGSize, AxError> {
    let v = copy_attr(element, attr)?;
    let mut s = CGSize::new(0.0, 0.0);
    let ok = unsafe { AXValueGetValue(v, K_AX_VALUE_CGSIZE_TYPE, (&raw mut s).cast()) };
    unsafe { CFRelease(v) };
    if !ok {
        return Err(AxError::Unsupported);
    }
    Ok(s)
}

pub(crate) fn ax_get_string(element: *mut c_void, attr: CFStringRef) -> Option<String> {
    let v = copy_attr(element, attr).ok()?;
    if !is_string(v) {
        unsafe { CFRelease(v) };
        return None;
    }
    let s = unsafe { CFString::wrap_under_create_rule(v as CFStringRef) };
    Some(s.to_string())
}

pub(crate) fn ax_is_settable(element: *mut c_void, attr: CFStringRef) -> Result<bool, AxError> {
    let mut settable: u8 = 0;
    let err = unsafe { AXUIElementIsAttributeSettable(element, attr, &mut settable) };
    if err != 0 {
        return Err(map_err(err));
    }
    Ok(settable != 0)
}

pub(crate) fn ax_set_point(element: *mut c_void, attr: CFStringRef, p: CGPoint) -> Result<(), AxError> {
    let v = unsafe { AXValueCreate(K_AX_VALUE_CGPOINT_TYPE, (&raw const p).cast()) };
    if v.is_null() {
        return Err(AxError::Unsupported);
    }
    let err = unsafe { AXUIElementSetAttributeValue(element, attr, v) };
    unsafe { CFRelease(v) };
    if err != 0 {
        return Err(map_err(err));
    }
    Ok(())
}

/// Retained elements of an array-valued attribute such as `AXChildren`.
pub(crate) fn ax_elements(element: *mut c_void, attr: CFStringRef) -> Vec<AXElem> {
    let Ok(v) = copy_attr(element, attr) else {
        return Vec::new();
    };
    if !is_array(v) {
        unsafe { CFRelease(v) };
        return Vec::new();
    }
    let arr = unsafe { CFArray::<*const c_void>::wrap_under_create_rule(v as _) };
    let n = unsafe { CFArrayGetCount(arr.as_concrete_TypeRef()) };
    let mut out = Vec::with_capacity(n.max(0) as usize);
    for i in 0..n {
        let item = unsafe { CFArrayGetValueAtIndex(arr.as_concrete_TypeRef(), i) } as *mut c_void;
        if let Some(e) = AXElem::retain_from_borrowed(item) {
            out.push(e);
        }
    }
    out
}
