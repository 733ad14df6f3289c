//! Annotation checks and review diagnostics.
//!
//! Rendering never fails; anything it had to guess about or could not
//! render correctly is reported here instead.

use ctbind_common::Diagnostic;

use crate::model::{BindingModule, Declaration, Function, Method};
use crate::param::{Annotation, Parameter};
use crate::render::Renderer;

/// Check one declaration.
pub fn validate_declaration(declaration: &Declaration, renderer: &Renderer) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    match declaration {
        Declaration::Class(class) => {
            for method in &class.methods {
                let method = renderer.with_implicit_annotations(method);
                let subject = format!("{}::{}", class.name, method.name);
                check_method(&method, &subject, renderer, &mut diagnostics);
            }
        }
        Declaration::Function(function) => check_function(function, renderer, &mut diagnostics),
        _ => {}
    }
    for diagnostic in &diagnostics {
        tracing::warn!(%diagnostic, "needs review");
    }
    diagnostics
}

/// Check every declaration of a module, in order.
pub fn validate_module(module: &BindingModule, renderer: &Renderer) -> Vec<Diagnostic> {
    module
        .declarations
        .iter()
        .flat_map(|decl| validate_declaration(decl, renderer))
        .collect()
}

fn check_function(function: &Function, renderer: &Renderer, out: &mut Vec<Diagnostic>) {
    let errors: Vec<&str> = function
        .error_parameters(renderer.translator())
        .map(|p| p.name.as_str())
        .collect();
    if errors.len() > 1 {
        out.push(
            Diagnostic::error(
                &function.name,
                format!("more than one error parameter: {}", errors.join(", ")),
            )
            .with_help("a function reports through a single error code"),
        );
    }
}

fn check_method(method: &Method, subject: &str, renderer: &Renderer, out: &mut Vec<Diagnostic>) {
    let params = method.parameters();
    for (index, param) in params.iter().enumerate() {
        match param.parsed_annotation() {
            Some(Annotation::ArrayCount(count)) => {
                if method.parameter(&count).is_none() {
                    out.push(Diagnostic::warning(
                        subject,
                        format!(
                            "`{}` is sized by `{}`, which is not a parameter",
                            param.name, count
                        ),
                    ));
                }
            }
            Some(Annotation::OutString) => {
                if params.get(index + 1).is_none() {
                    out.push(
                        Diagnostic::warning(
                            subject,
                            format!("output string `{}` has no length parameter", param.name),
                        )
                        .with_help("the parameter following an out_string carries its length"),
                    );
                }
            }
            Some(Annotation::SizeOf(buffer)) => {
                let target = method.parameter(&buffer);
                if target.and_then(|b| b.ty.pointee()).is_none() {
                    out.push(Diagnostic::warning(
                        subject,
                        format!(
                            "`{}` is the size of `{}`, which is not a pointer parameter",
                            param.name, buffer
                        ),
                    ));
                }
            }
            _ => {}
        }

        if index > 0 && looks_like_unannotated_size(param, &params[index - 1], renderer) {
            let previous = &params[index - 1];
            out.push(
                Diagnostic::warning(
                    subject,
                    format!(
                        "`{}` looks like the size of output `{}` but carries no annotation",
                        param.name, previous.name
                    ),
                )
                .with_help(format!(
                    "annotate it with `size_of:{};` or list it under [annotations.implicit]",
                    previous.name
                )),
            );
        }
    }
}

/// An unannotated integer named like a byte size that directly follows an
/// output pointer.
fn looks_like_unannotated_size(param: &Parameter, previous: &Parameter, renderer: &Renderer) -> bool {
    if param.parsed_annotation().is_some() || param.is_count() || param.ty.is_pointer() {
        return false;
    }
    if !previous.is_output() || previous.is_array().is_some() || previous.is_out_string() {
        return false;
    }
    let ty = renderer.translate(param.ty.spelling());
    let integer = ty.starts_with("c_int") || ty.starts_with("c_uint");
    let name = param.name.as_str();
    integer && (name.ends_with("Size") || name.starts_with("uncb") || name.starts_with("cb"))
}
