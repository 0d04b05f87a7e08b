//! FFI 导出函数
//!
//! 供 C/C++ 识别客户端调用的短语列表语法接口。
//! 会话与语法均以不透明指针传递，由对应的 `_free` 函数释放。

use super::safety::{c_str_arg, check_null, check_null_mut, ffi_safe_call, to_ffi_result};
use super::types::PhraseBiasResult;
use crate::grammar::PhraseListGrammar;
use crate::session::RecognitionSession;
use std::ffi::CString;
use std::os::raw::c_char;

/// 创建识别会话（初始状态为 Initializing）
#[no_mangle]
pub extern "C" fn phrasebias_session_create() -> *mut RecognitionSession {
    crate::init_logging();
    Box::into_raw(Box::new(RecognitionSession::new()))
}

/// 标记会话就绪
#[no_mangle]
pub extern "C" fn phrasebias_session_activate(session: *const RecognitionSession) -> PhraseBiasResult {
    match ffi_safe_call(|| {
        check_null(session, "session")?;
        let session = unsafe { &*session };

        to_ffi_result(session.activate())?;
        Ok(PhraseBiasResult::Success)
    }) {
        Ok(result) => result,
        Err(e) => e,
    }
}

/// 结束会话，已绑定的语法随之失效
#[no_mangle]
pub extern "C" fn phrasebias_session_end(session: *const RecognitionSession) -> PhraseBiasResult {
    match ffi_safe_call(|| {
        check_null(session, "session")?;
        let session = unsafe { &*session };

        session.end();
        Ok(PhraseBiasResult::Success)
    }) {
        Ok(result) => result,
        Err(e) => e,
    }
}

/// 释放会话（隐含结束）
#[no_mangle]
pub extern "C" fn phrasebias_session_free(session: *mut RecognitionSession) {
    if session.is_null() {
        return;
    }

    unsafe {
        drop(Box::from_raw(session));
    }
}

/// 为会话创建短语列表语法
#[no_mangle]
pub extern "C" fn phrasebias_grammar_from_session(
    session: *const RecognitionSession,
    grammar: *mut *mut PhraseListGrammar,
) -> PhraseBiasResult {
    match ffi_safe_call(|| {
        check_null(session, "session")?;
        check_null_mut(grammar, "grammar")?;
        let session = unsafe { &*session };

        let created = to_ffi_result(PhraseListGrammar::from_session(&session.handle()))?;
        unsafe {
            *grammar = Box::into_raw(Box::new(created));
        }
        Ok(PhraseBiasResult::Success)
    }) {
        Ok(result) => result,
        Err(e) => e,
    }
}

/// 添加短语
#[no_mangle]
pub extern "C" fn phrasebias_grammar_add_phrase(
    grammar: *const PhraseListGrammar,
    phrase: *const c_char,
) -> PhraseBiasResult {
    match ffi_safe_call(|| {
        check_null(grammar, "grammar")?;
        let phrase = c_str_arg(phrase, "phrase")?;
        let grammar = unsafe { &*grammar };

        to_ffi_result(grammar.add_phrase(phrase))?;
        Ok(PhraseBiasResult::Success)
    }) {
        Ok(result) => result,
        Err(e) => e,
    }
}

/// 设置偏置权重
#[no_mangle]
pub extern "C" fn phrasebias_grammar_set_weight(
    grammar: *const PhraseListGrammar,
    weight: f64,
) -> PhraseBiasResult {
    match ffi_safe_call(|| {
        check_null(grammar, "grammar")?;
        let grammar = unsafe { &*grammar };

        to_ffi_result(grammar.set_weight(weight))?;
        Ok(PhraseBiasResult::Success)
    }) {
        Ok(result) => result,
        Err(e) => e,
    }
}

/// 清空短语
#[no_mangle]
pub extern "C" fn phrasebias_grammar_clear(grammar: *const PhraseListGrammar) -> PhraseBiasResult {
    match ffi_safe_call(|| {
        check_null(grammar, "grammar")?;
        let grammar = unsafe { &*grammar };

        to_ffi_result(grammar.clear())?;
        Ok(PhraseBiasResult::Success)
    }) {
        Ok(result) => result,
        Err(e) => e,
    }
}

/// 读取当前短语（每行一个）和权重
///
/// `text` 需用 `phrasebias_string_free` 释放
#[no_mangle]
pub extern "C" fn phrasebias_grammar_get_phrases(
    grammar: *const PhraseListGrammar,
    text: *mut *mut c_char,
    weight: *mut f64,
) -> PhraseBiasResult {
    match ffi_safe_call(|| {
        check_null(grammar, "grammar")?;
        check_null_mut(text, "text")?;
        check_null_mut(weight, "weight")?;
        let grammar = unsafe { &*grammar };

        let snapshot = to_ffi_result(grammar.snapshot())?;
        let buffer = CString::new(snapshot.to_hotwords_buffer())
            .map_err(|_| PhraseBiasResult::InternalError)?;

        unsafe {
            *text = buffer.into_raw();
            *weight = snapshot.weight();
        }
        Ok(PhraseBiasResult::Success)
    }) {
        Ok(result) => result,
        Err(e) => e,
    }
}

/// 释放语法（解除与会话的关联，不影响会话）
#[no_mangle]
pub extern "C" fn phrasebias_grammar_free(grammar: *mut PhraseListGrammar) {
    if grammar.is_null() {
        return;
    }

    unsafe {
        drop(Box::from_raw(grammar));
    }
}

/// 释放本库分配的字符串
#[no_mangle]
pub extern "C" fn phrasebias_string_free(text: *mut c_char) {
    if text.is_null() {
        return;
    }

    unsafe {
        drop(CString::from_raw(text));
    }
}

/// 获取版本字符串
#[no_mangle]
pub extern "C" fn phrasebias_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}
