//! Free functions exported by the native library.

use super::writer::{lower_first, CodeWriter};
use super::Renderer;
use crate::model::Function;
use crate::param::Parameter;

impl Renderer {
    /// Render the `restype`/`argtypes` declarations followed by a wrapper
    /// that allocates the error output, calls the library and checks the
    /// error code.
    pub fn render_function(&self, function: &Function) -> String {
        let handle = &self.config.library.handle;
        let native = &function.name;
        let errors: Vec<&Parameter> = function.error_parameters(&self.translator).collect();
        if errors.len() > 1 {
            tracing::warn!(function = %native, count = errors.len(), "several error parameters");
        }

        let argtypes = function
            .parameters
            .iter()
            .map(|p| self.translate(p.ty.spelling()))
            .collect::<Vec<_>>()
            .join(", ");
        let signature = function
            .parameters
            .iter()
            .filter(|p| !p.is_error(&self.translator))
            .map(|p| match &p.default_value {
                Some(default) => format!("{}={}", p.ident(), default),
                None => p.ident(),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let call = function
            .parameters
            .iter()
            .map(|p| self.function_call_arg(p))
            .collect::<Vec<_>>()
            .join(", ");

        let mut w = CodeWriter::new();
        w.writeln(&format!(
            "{}.{}.restype = {}",
            handle,
            native,
            self.translate(&function.return_type)
        ));
        w.writeln(&format!("{}.{}.argtypes = [{}]", handle, native, argtypes));
        w.blank();
        w.blank();
        w.open(&format!("def {}({}):", self.python_function_name(native), signature));
        if let Some(doc) = &function.docstring {
            w.docstring(doc);
        }
        for error in &errors {
            if let Some(pointee) = error.pointee_type(&self.translator) {
                w.writeln(&format!("{} = {}()", error.ident(), pointee));
            }
        }
        w.writeln(&format!("result = {}.{}({})", handle, native, call));
        for error in &errors {
            w.writeln(&format!(
                "{}({}.value)",
                self.config.interface.init_error_check,
                error.ident()
            ));
        }
        w.writeln("return result");
        w.close();
        w.finish()
    }

    /// `VR_GetGenericInterface` -> `getGenericInterface`.
    pub fn python_function_name(&self, native: &str) -> String {
        let stripped = native
            .strip_prefix(self.config.library.function_prefix.as_str())
            .unwrap_or(native);
        lower_first(stripped)
    }

    /// Pointers to const data go by value, other pointers by reference.
    fn function_call_arg(&self, param: &Parameter) -> String {
        let ident = param.ident();
        match param.ty.pointee() {
            Some(pointee) if !pointee.is_const_qualified() => format!("byref({})", ident),
            _ => ident,
        }
    }
}
