//! End-to-end rendering tests.
//!
//! Each test builds (or loads) a small OpenVR-shaped model and checks
//! properties of the generated Python rather than whole files.

use ctbind_config::BindingConfig;
use ctbind_core::{
    render_module, validate_module, BindingModule, CType, Class, Declaration, Function, Method,
    Parameter, Renderer, Typedef,
};

const MODEL_JSON: &str = r#"{
  "declarations": [
    { "kind": "constant", "name": "k_unMaxTrackedDeviceCount", "value": "64" },
    { "kind": "typedef", "name": "TrackedDeviceIndex_t", "original": "uint32_t" },
    { "kind": "typedef", "name": "HmdMatrix34_t", "original": "struct vr::HmdMatrix34_t" },
    {
      "kind": "struct",
      "name": "vr::HmdMatrix34_t",
      "fields": [ { "name": "m", "type": "float [3][4]" } ]
    },
    {
      "kind": "class",
      "name": "vr::IVRSystem",
      "docstring": "Main interface for display, distortion, tracking and events.",
      "methods": [
        {
          "name": "GetRecommendedRenderTargetSize",
          "return_type": "void",
          "parameters": [
            { "name": "pnWidth", "type": { "kind": "pointer", "spelling": "uint32_t *", "pointee": { "kind": "builtin", "spelling": "uint32_t" } } },
            { "name": "pnHeight", "type": { "kind": "pointer", "spelling": "uint32_t *", "pointee": { "kind": "builtin", "spelling": "uint32_t" } } }
          ]
        },
        {
          "name": "GetStringTrackedDeviceProperty",
          "return_type": "uint32_t",
          "parameters": [
            { "name": "unDeviceIndex", "type": { "kind": "typedef", "spelling": "vr::TrackedDeviceIndex_t" } },
            { "name": "prop", "type": { "kind": "enum", "spelling": "vr::ETrackedDeviceProperty" } },
            { "name": "pchValue", "type": { "kind": "pointer", "spelling": "char *", "pointee": { "kind": "builtin", "spelling": "char" } }, "annotation": "out_string: ;" },
            { "name": "unBufferSize", "type": { "kind": "builtin", "spelling": "uint32_t" } },
            { "name": "pError", "type": { "kind": "pointer", "spelling": "vr::ETrackedPropertyError *", "pointee": { "kind": "enum", "spelling": "vr::ETrackedPropertyError" } } }
          ]
        },
        {
          "name": "PollNextEvent",
          "return_type": "bool",
          "parameters": [
            { "name": "pEvent", "type": { "kind": "pointer", "spelling": "vr::VREvent_t *", "pointee": { "kind": "record", "spelling": "vr::VREvent_t" } } },
            { "name": "uncbVREvent", "type": { "kind": "builtin", "spelling": "uint32_t" } }
          ]
        }
      ]
    },
    {
      "kind": "function",
      "name": "VR_InitInternal",
      "return_type": "uint32_t",
      "parameters": [
        { "name": "peError", "type": { "kind": "pointer", "spelling": "vr::EVRInitError *", "pointee": { "kind": "enum", "spelling": "vr::EVRInitError" } } },
        { "name": "eApplicationType", "type": { "kind": "enum", "spelling": "vr::EVRApplicationType" } }
      ]
    }
  ]
}"#;

fn load() -> BindingModule {
    BindingModule::from_json_str(MODEL_JSON).expect("model should parse")
}

#[test]
fn test_self_alias_typedef_is_dropped() {
    let fragments = render_module(&Renderer::default(), &load());
    assert_eq!(fragments.len(), 5);
    assert_eq!(fragments[0], "k_unMaxTrackedDeviceCount = 64");
    assert_eq!(fragments[1], "TrackedDeviceIndex_t = c_uint32");
    assert!(fragments[2].starts_with("class HmdMatrix34_t(_MatrixMixin, Structure):"));
}

#[test]
fn test_method_order_is_preserved() {
    let fragments = render_module(&Renderer::default(), &load());
    let class = &fragments[3];
    let positions: Vec<usize> = [
        "getRecommendedRenderTargetSize",
        "getStringTrackedDeviceProperty",
        "pollNextEvent",
    ]
    .iter()
    .map(|name| class.find(&format!("(\"{}\"", name)).expect("fn table entry"))
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let defs: Vec<usize> = ["def getRecommendedRenderTargetSize", "def getStringTrackedDeviceProperty", "def pollNextEvent"]
        .iter()
        .map(|d| class.find(d).expect("wrapper method"))
        .collect();
    assert!(defs.windows(2).all(|w| w[0] < w[1]));
    assert!(positions[2] < defs[0]);
}

#[test]
fn test_out_string_probe_precedes_real_call() {
    let fragments = render_module(&Renderer::default(), &load());
    let class = &fragments[3];
    let probe = class
        .find("unBufferSize = fn(unDeviceIndex, prop, None, 0, byref(pError))")
        .expect("probe call");
    let early = class.find("return b''").expect("empty-string return");
    let call = "fn(unDeviceIndex, prop, pchValue, unBufferSize, byref(pError))";
    let real = class.find(call).expect("real call");
    assert!(probe < early && early < real);
    assert_eq!(class.matches(call).count(), 1);
    assert!(class.contains("return bytes(pchValue.value)"));
}

#[test]
fn test_error_outputs_raise() {
    let fragments = render_module(&Renderer::default(), &load());
    assert!(fragments[3].contains(
        "        if pError.value != 0:\n            raise OpenVRError(str(pError))\n"
    ));
    let function = &fragments[4];
    assert!(function.contains("def initInternal(eApplicationType):"));
    assert!(function.contains("    peError = EVRInitError()\n"));
    assert!(function.contains("    _checkInitError(peError.value)\n"));
}

#[test]
fn test_model_is_valid() {
    let diagnostics = validate_module(&load(), &Renderer::default());
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
}

#[test]
fn test_count_declared_before_array() {
    let mut class = Class::new("vr::IVRSystem");
    class.add_method(
        Method::new("GetDeviceToAbsoluteTrackingPose", "void")
            .with_parameter(Parameter::new(
                "unTrackedDevicePoseArrayCount",
                CType::builtin("uint32_t"),
            ))
            .with_parameter(
                Parameter::new(
                    "pTrackedDevicePoseArray",
                    CType::record("vr::TrackedDevicePose_t").ptr(),
                )
                .with_annotation("array_count:unTrackedDevicePoseArrayCount;"),
            ),
    );
    let rendered = Renderer::default().render_declaration(&Declaration::Class(class));
    assert!(rendered.contains("def getDeviceToAbsoluteTrackingPose(self, pTrackedDevicePoseArray):"));
    assert!(rendered.contains("fn(unTrackedDevicePoseArrayCount, pTrackedDevicePoseArrayArg)"));
}

#[test]
fn test_configuration_changes_output() {
    let config = BindingConfig::from_toml_str(
        r#"
[library]
handle = "_phonon"
function_prefix = "ipl"

[types]
namespace = ""
strip_prefix = "IPL"
bool_alias = "c_bool"
        "#,
    )
    .expect("config should parse");
    let renderer = Renderer::new(config);

    let function = Function::new("iplContextCreate", "bool")
        .with_parameter(Parameter::new("settings", CType::record("IPLContextSettings").const_ptr()));
    let rendered = renderer.render_function(&function);
    assert!(rendered.starts_with("_phonon.iplContextCreate.restype = c_bool\n"));
    assert!(rendered.contains("_phonon.iplContextCreate.argtypes = [POINTER(ContextSettings)]"));
    assert!(rendered.contains("def contextCreate(settings):"));
    assert!(rendered.contains("result = _phonon.iplContextCreate(settings)"));

    assert_eq!(
        renderer.render_typedef(&Typedef::new("IPLfloat32", "float")),
        "IPLfloat32 = c_float"
    );
}

#[test]
fn test_load_model_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openvr.json");
    std::fs::write(&path, MODEL_JSON).unwrap();
    let module = BindingModule::from_file(&path).unwrap();
    assert_eq!(module, load());
}
