#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

use ps_wasm::WasmFilterEngine;

fn get(object: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(object, &key.into()).expect("property should exist")
}

#[wasm_bindgen_test]
fn load_lists_reports_stats() {
    let mut engine = WasmFilterEngine::new(false, false);
    let lists = js_sys::Array::new();
    lists.push(&JsValue::from_str("||ads.example.com/banner^$image\n##.generic-ad"));
    lists.push(&JsValue::NULL);

    let stats = engine.load_lists(lists.into()).expect("one list loads");
    assert_eq!(get(&stats, "networkRules").as_f64(), Some(1.0));
    assert_eq!(get(&stats, "cosmeticRules").as_f64(), Some(1.0));
    assert_eq!(get(&stats, "failed").as_f64(), Some(1.0));
    assert!(engine.is_initialized());
}

#[wasm_bindgen_test]
fn match_request_reports_rule() {
    let mut engine = WasmFilterEngine::new(false, false);
    let lists = js_sys::Array::new();
    lists.push(&JsValue::from_str("! header\n0.0.0.0 tracker.example.com"));
    engine.load_lists(lists.into()).expect("list loads");

    let result = engine.match_request("http://tracker.example.com/pixel.gif");
    assert_eq!(get(&result, "blocked").as_bool(), Some(true));
    assert_eq!(get(&result, "ruleId").as_f64(), Some(0.0));

    let result = engine.match_request("https://music.youtube.com/");
    assert_eq!(get(&result, "blocked").as_bool(), Some(false));
    assert_eq!(get(&result, "ruleId").as_f64(), Some(-1.0));
}

#[wasm_bindgen_test]
fn load_lists_rejects_empty_input() {
    let mut engine = WasmFilterEngine::new(false, false);
    assert!(engine.load_lists(js_sys::Array::new().into()).is_err());
    assert!(!engine.is_initialized());
}
