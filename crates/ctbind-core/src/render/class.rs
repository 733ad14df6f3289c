//! Interface classes: the function-table layout and the wrapper class.

use super::writer::CodeWriter;
use super::Renderer;
use crate::model::Class;

impl Renderer {
    /// Render the function-table layout followed by the wrapper class.
    pub fn render_class(&self, class: &Class) -> String {
        format!(
            "{}\n\n\n{}",
            self.render_fn_table(class),
            self.render_wrapper(class)
        )
    }

    /// Render the `<Name>_FnTable` structure, one entry per method in
    /// function-table order.
    pub fn render_fn_table(&self, class: &Class) -> String {
        let name = self.translate(&class.name);
        let mut w = CodeWriter::new();
        w.open(&format!("class {}_FnTable(Structure):", name));
        if class.methods.is_empty() {
            w.writeln("_fields_ = []");
        } else {
            w.open("_fields_ = [");
            for method in &class.methods {
                w.writeln(&self.render_fn_table_entry(method));
            }
            w.close();
            w.writeln("]");
        }
        w.finish()
    }

    fn render_wrapper(&self, class: &Class) -> String {
        let name = self.translate(&class.name);
        let iface = &self.config.interface;
        let mut w = CodeWriter::new();
        w.open(&format!("class {}({}):", name, class.base));
        if let Some(doc) = &class.docstring {
            w.docstring(doc);
            w.blank();
        }

        w.open("def __init__(self):");
        w.writeln(&format!("version_key = {}{}", name, iface.version_suffix));
        w.open(&format!("if not {}(version_key):", iface.version_check));
        w.writeln(&format!(
            "{}({})",
            iface.init_error_check, iface.interface_not_found
        ));
        w.close();
        w.writeln(&format!(
            "fn_key = b\"{}\" + version_key",
            iface.fn_table_key_prefix
        ));
        w.writeln(&format!("fn_type = {}_FnTable", name));
        w.writeln(&format!(
            "fn_table_ptr = cast({}(fn_key), POINTER(fn_type))",
            iface.lookup
        ));
        w.open("if fn_table_ptr is None:");
        w.writeln(&format!(
            "raise {}(\"Error retrieving API for {}\")",
            iface.error_class, name
        ));
        w.close();
        w.writeln("self.function_table = fn_table_ptr.contents");
        w.close();

        for method in &class.methods {
            w.blank();
            self.write_method(&mut w, method);
        }
        w.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Method;
    use crate::param::Parameter;
    use crate::types::CType;

    #[test]
    fn test_empty_class() {
        let class = Class::new("vr::IVRExtendedDisplay").with_docstring("Extended display.");
        let expected = "\
class IVRExtendedDisplay_FnTable(Structure):
    _fields_ = []


class IVRExtendedDisplay(object):
    \"\"\"Extended display.\"\"\"

    def __init__(self):
        version_key = IVRExtendedDisplay_Version
        if not isInterfaceVersionValid(version_key):
            _checkInitError(VRInitError_Init_InterfaceNotFound)
        fn_key = b\"FnTable:\" + version_key
        fn_type = IVRExtendedDisplay_FnTable
        fn_table_ptr = cast(getGenericInterface(fn_key), POINTER(fn_type))
        if fn_table_ptr is None:
            raise OpenVRError(\"Error retrieving API for IVRExtendedDisplay\")
        self.function_table = fn_table_ptr.contents";
        assert_eq!(Renderer::default().render_class(&class), expected);
    }

    #[test]
    fn test_methods_follow_init() {
        let mut class = Class::new("IVRChaperone");
        class.add_method(Method::new("GetCalibrationState", "vr::ChaperoneCalibrationState"));
        class.add_method(
            Method::new("GetPlayAreaSize", "bool")
                .with_parameter(Parameter::new("pSizeX", CType::builtin("float").ptr()))
                .with_parameter(Parameter::new("pSizeZ", CType::builtin("float").ptr())),
        );
        let rendered = Renderer::default().render_class(&class);
        assert!(rendered.contains(
            "        (\"getCalibrationState\", OPENVR_FNTABLE_CALLTYPE(ChaperoneCalibrationState)),\n        (\"getPlayAreaSize\", OPENVR_FNTABLE_CALLTYPE(openvr_bool, POINTER(c_float), POINTER(c_float))),\n    ]"
        ));
        assert!(rendered.contains(
            "self.function_table = fn_table_ptr.contents\n\n    def getCalibrationState(self):\n        fn = self.function_table.getCalibrationState\n"
        ));
        assert!(rendered.ends_with("        return result, pSizeX.value, pSizeZ.value"));
    }
}
