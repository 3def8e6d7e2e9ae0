use std::ffi::c_void;

use core_foundation::{
    base::{CFTypeRef, TCFType},
    dictionary::{CFDictionaryGetValue, CFDictionaryRef},
    number::CFNumber,
    string::{CFString, CFStringRef},
};

unsafe extern "C" {
    fn CFGetTypeID(cf: CFTypeRef) -> usize;
    fn CFDictionaryGetTypeID() -> usize;
    fn CFStringGetTypeID() -> usize;
    fn CFArrayGetTypeID() -> usize;
}

fn dict_value(dict: CFDictionaryRef, key: CFStringRef) -> Option<CFTypeRef> {
    let value = unsafe { CFDictionaryGetValue(dict, key as *const c_void) };
    if value.is_null() { None } else { Some(value) }
}

/// True when `cf` is a CFDictionary.
pub(crate) fn is_dict(cf: CFTypeRef) -> bool {
    !cf.is_null() && unsafe { CFGetTypeID(cf) == CFDictionaryGetTypeID() }
}

/// True when `cf` is a CFString.
pub(crate) fn is_string(cf: CFTypeRef) -> bool {
    !cf.is_null() && unsafe { CFGetTypeID(cf) == CFStringGetTypeID() }
}

/// True when `cf` is a CFArray.
pub(crate) fn is_array(cf: CFTypeRef) -> bool {
    !cf.is_null() && unsafe { CFGetTypeID(cf) == CFArrayGetTypeID() }
}

/// Get a String value for the given CFDictionary key.
pub(crate) fn dict_get_string(dict: CFDictionaryRef, key: CFStringRef) -> Option<String> {
    let value = dict_value(dict, key).filter(|v| is_string(*v))?;
    // SAFETY: value borrowed from the dictionary; wrap under get rule.
    let s = unsafe { CFString::wrap_under_get_rule(value as CFStringRef) };
    Some(s.to_string())
}

/// Get a 32-bit integer from CFDictionary for the given key.
pub(crate) fn dict_get_i32(dict: CFDictionaryRef, key: CFStringRef) -> Option<i32> {
    let value = dict_value(dict, key)?;
    let n = unsafe { CFNumber::wrap_under_get_rule(value as _) };
    n.to_i64().and_then(|v| i32::try_from(v).ok())
}

/// Get an f64 from CFDictionary for the given key.
pub(crate) fn dict_get_f64(dict: CFDictionaryRef, key: CFStringRef) -> Option<f64> {
    let value = dict_value(dict, key)?;
    let n = unsafe { CFNumber::wrap_under_get_rule(value as _) };
    n.to_f64()
}

/// Get a nested dictionary for the given key.
pub(crate) fn dict_get_dict(dict: CFDictionaryRef, key: CFStringRef) -> Option<CFDictionaryRef> {
    let value = dict_value(dict, key)?;
    is_dict(value).then_some(value as CFDictionaryRef)
}

/// Read a `{X, Y, Width, Height}` bounds dictionary.
pub(crate) fn dict_get_bounds(
    dict: CFDictionaryRef,
    key: CFStringRef,
) -> Option<(f64, f64, f64, f64)> {
    let b = dict_get_dict(dict, key)?;
    let k = |name: &'static str| CFString::from_static_string(name);
    Some((
        dict_get_f64(b, k("X").as_concrete_TypeRef())?,
        dict_get_f64(b, k("Y").as_concrete_TypeRef())?,
        dict_get_f64(b, k("Width").as_concrete_TypeRef())?,
        dict_get_f64(b, k("Height").as_concrete_TypeRef())?,
    ))
}
