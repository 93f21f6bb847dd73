//! OpenGL entry point lookup for the context current on this thread

use std::ffi::{CStr, c_void};

use windows_sys::Win32::Graphics::OpenGL::wglGetProcAddress;
use windows_sys::Win32::System::LibraryLoader::{GetModuleHandleA, GetProcAddress, LoadLibraryA};

const OPENGL32: &CStr = c"opengl32.dll";

/// Resolve `name` through `wglGetProcAddress`, falling back to the exports of
/// `opengl32.dll` for the GL 1.1 functions the ICD does not hand out.
pub(crate) fn proc_address(name: &CStr) -> *const c_void {
    let ptr = unsafe { wglGetProcAddress(name.as_ptr().cast()) }
        .map_or(std::ptr::null(), |f| f as *const c_void);
    // Some drivers return small sentinel values instead of null.
    if !matches!(ptr as isize, -1 | 0 | 1 | 2 | 3) {
        return ptr;
    }

    unsafe {
        let mut module = GetModuleHandleA(OPENGL32.as_ptr().cast());
        if module == 0 {
            module = LoadLibraryA(OPENGL32.as_ptr().cast());
        }
        if module == 0 {
            tracing::warn!(target: "dear-overlay", "opengl32.dll is not available");
            return std::ptr::null();
        }
        GetProcAddress(module, name.as_ptr().cast()).map_or(std::ptr::null(), |f| f as *const c_void)
    }
}

/// Build a glow context over the GL context current on this thread
pub(crate) fn load_current_context() -> glow::Context {
    unsafe { glow::Context::from_loader_function_cstr(proc_address) }
}
