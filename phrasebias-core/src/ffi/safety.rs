//! FFI 安全封装
//!
//! 使用 catch_unwind 防止 panic 跨越 FFI 边界

use super::types::PhraseBiasResult;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// FFI 安全调用包装器
///
/// 捕获所有 panic，防止其跨越 FFI 边界
pub fn ffi_safe_call<F, T>(f: F) -> Result<T, PhraseBiasResult>
where
    F: FnOnce() -> Result<T, PhraseBiasResult>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic_err) => {
            // 记录 panic 信息
            if let Some(msg) = panic_err.downcast_ref::<&str>() {
                tracing::error!("FFI panic: {}", msg);
            } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                tracing::error!("FFI panic: {}", msg);
            } else {
                tracing::error!("FFI panic: unknown error");
            }

            Err(PhraseBiasResult::InternalError)
        }
    }
}

/// 将 Rust Result 转换为 FFI 结果码（保留错误类别）
pub fn to_ffi_result<T>(result: crate::BiasResult<T>) -> Result<T, PhraseBiasResult> {
    result.map_err(|e| {
        tracing::warn!("FFI error: {}", e);
        PhraseBiasResult::from(e.kind())
    })
}

/// 验证指针非空
#[inline]
pub fn check_null<T>(ptr: *const T, param_name: &str) -> Result<(), PhraseBiasResult> {
    if ptr.is_null() {
        tracing::error!("Null pointer: {}", param_name);
        Err(PhraseBiasResult::NullPointer)
    } else {
        Ok(())
    }
}

/// 验证可变指针非空
#[inline]
pub fn check_null_mut<T>(ptr: *mut T, param_name: &str) -> Result<(), PhraseBiasResult> {
    if ptr.is_null() {
        tracing::error!("Null pointer: {}", param_name);
        Err(PhraseBiasResult::NullPointer)
    } else {
        Ok(())
    }
}

/// 读取以 null 结尾的 UTF-8 字符串参数
///
/// 调用方需保证 `ptr` 在返回值使用期间有效
pub fn c_str_arg<'a>(ptr: *const c_char, param_name: &str) -> Result<&'a str, PhraseBiasResult> {
    check_null(ptr, param_name)?;

    let text = unsafe { CStr::from_ptr(ptr) };
    text.to_str().map_err(|_| {
        tracing::error!("Invalid UTF-8: {}", param_name);
        PhraseBiasResult::InvalidArgument
    })
}
