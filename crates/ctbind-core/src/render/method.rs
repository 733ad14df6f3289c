//! Interface method wrappers and function-table entries.
//!
//! A wrapper method is assembled from per-parameter fragments: the name it
//! takes in the signature, the statements run before and after the native
//! call, the argument handed to the call, and what it contributes to the
//! returned tuple.

use super::writer::{lower_first, CodeWriter};
use super::Renderer;
use crate::model::Method;
use crate::param::Parameter;

impl Renderer {
    /// The method's entry in its interface's function-table layout:
    /// `("name", CALLTYPE(restype, argtypes...)),`
    pub fn render_fn_table_entry(&self, method: &Method) -> String {
        let mut types = vec![self.translate(&method.return_type)];
        types.extend(
            method
                .parameters()
                .iter()
                .map(|p| self.translate(p.ty.spelling())),
        );
        format!(
            "(\"{}\", {}({})),",
            lower_first(&method.name),
            self.config.interface.calltype,
            types.join(", ")
        )
    }

    /// Render a wrapper method at indentation zero.
    pub fn render_method(&self, method: &Method) -> String {
        let mut w = CodeWriter::new();
        self.write_method(&mut w, method);
        w.finish()
    }

    pub(crate) fn write_method(&self, w: &mut CodeWriter, method: &Method) {
        let method = self.with_implicit_annotations(method);
        let params = method.parameters();
        let name = lower_first(&method.name);
        let has_return = method.has_return(&self.translator);

        let mut signature = vec!["self".to_string()];
        signature.extend(params.iter().filter_map(|p| self.param_signature(p)));
        w.open(&format!("def {}({}):", name, signature.join(", ")));
        if let Some(doc) = &method.docstring {
            w.docstring(doc);
            w.blank();
        }
        w.writeln(&format!("fn = self.function_table.{}", name));

        for param in params {
            self.write_pre_call(w, param, &method);
        }
        for (index, param) in params.iter().enumerate() {
            if param.is_out_string() {
                self.write_string_probe(w, params, index);
            }
        }

        let args = params
            .iter()
            .map(|p| self.param_call_arg(p))
            .collect::<Vec<_>>()
            .join(", ");
        if has_return {
            w.writeln(&format!("result = fn({})", args));
        } else {
            w.writeln(&format!("fn({})", args));
        }

        for param in params {
            self.write_post_call(w, param);
        }

        let mut returns = Vec::new();
        if has_return {
            returns.push("result".to_string());
        }
        returns.extend(params.iter().filter_map(|p| self.param_return(p)));
        if !returns.is_empty() {
            w.writeln(&format!("return {}", returns.join(", ")));
        }
        w.close();
    }

    /// Signature entry, with default if any; `None` for hidden parameters.
    fn param_signature(&self, param: &Parameter) -> Option<String> {
        if !param.is_input() {
            return None;
        }
        Some(match &param.default_value {
            Some(default) => format!("{}={}", param.ident(), default),
            None => param.ident(),
        })
    }

    fn write_pre_call(&self, w: &mut CodeWriter, param: &Parameter, method: &Method) {
        let ident = param.ident();

        if let Some(count) = param.is_array() {
            let element = param
                .pointee_type(&self.translator)
                .unwrap_or_else(|| self.translate(param.ty.spelling()));
            let count_ident = super::writer::sanitize_identifier(&count);
            let arrays = &self.config.arrays;
            w.open(&format!("if {} is None:", ident));
            if arrays.is_device_count(&count) {
                w.writeln(&format!("{} = {}", count_ident, arrays.max_device_count));
                w.writeln(&format!("{} = ({} * {})()", ident, element, count_ident));
                w.writeln(&format!("{}Arg = byref({}[0])", ident, ident));
            } else {
                w.writeln(&format!("{} = 0", count_ident));
                w.writeln(&format!("{}Arg = None", ident));
            }
            w.close();
            w.open("else:");
            w.writeln(&format!("{} = len({})", count_ident, ident));
            w.writeln(&format!("{}Arg = byref({}[0])", ident, ident));
            w.close();
            return;
        }

        if param.is_out_string() || param.is_count() {
            return;
        }

        if let Some(buffer) = param.size_of() {
            match method
                .parameter(&buffer)
                .and_then(|b| b.pointee_type(&self.translator))
            {
                Some(pointee) => w.writeln(&format!("{} = sizeof({})", ident, pointee)),
                None => tracing::warn!(
                    method = %method.name,
                    param = %param.name,
                    buffer = %buffer,
                    "size_of names no pointer parameter"
                ),
            }
            return;
        }

        if !param.is_input() {
            if let Some(pointee) = param.pointee_type(&self.translator) {
                w.writeln(&format!("{} = {}()", ident, pointee));
            }
        }
    }

    /// Zero-length call that sizes an output string, followed by the buffer
    /// allocation. Returns `b''` early when the value is empty.
    fn write_string_probe(&self, w: &mut CodeWriter, params: &[Parameter], index: usize) {
        let string = &params[index];
        let Some(len_param) = params.get(index + 1) else {
            tracing::warn!(param = %string.name, "out_string has no length parameter");
            return;
        };
        let args = params
            .iter()
            .enumerate()
            .map(|(j, p)| {
                if j == index {
                    "None".to_string()
                } else if j == index + 1 {
                    "0".to_string()
                } else {
                    self.param_call_arg(p)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let len = len_param.ident();
        w.writeln(&format!("{} = fn({})", len, args));
        w.open(&format!("if {} == 0:", len));
        w.writeln("return b''");
        w.close();
        w.writeln(&format!(
            "{} = ctypes.create_string_buffer({})",
            string.ident(),
            len
        ));
    }

    fn param_call_arg(&self, param: &Parameter) -> String {
        let ident = param.ident();
        if param.is_array().is_some() {
            format!("{}Arg", ident)
        } else if param.is_count() || param.is_out_string() || !param.is_output() {
            ident
        } else {
            format!("byref({})", ident)
        }
    }

    fn write_post_call(&self, w: &mut CodeWriter, param: &Parameter) {
        if param.is_error(&self.translator) {
            let ident = param.ident();
            w.open(&format!("if {}.value != 0:", ident));
            w.writeln(&format!(
                "raise {}(str({}))",
                self.config.interface.error_class, ident
            ));
            w.close();
        }
    }

    /// Expression added to the returned tuple, if any.
    fn param_return(&self, param: &Parameter) -> Option<String> {
        if param.is_error(&self.translator) {
            return None;
        }
        let ident = param.ident();
        if param.is_out_string() {
            return Some(format!("bytes({}.value)", ident));
        }
        if !param.is_output() {
            return None;
        }
        if param.is_array().is_some() {
            return Some(ident);
        }
        let primitive = param
            .pointee_type(&self.translator)
            .is_some_and(|t| t.starts_with(crate::translate::PRIMITIVE_MARKER));
        Some(if primitive {
            format!("{}.value", ident)
        } else {
            ident
        })
    }
}
