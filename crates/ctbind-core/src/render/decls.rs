//! Structures, forward declarations, enums, typedefs and constants.

use super::writer::CodeWriter;
use super::{first_line, Renderer};
use crate::model::{ConstantDeclaration, EnumDecl, Struct, StructureForwardDeclaration, Typedef};

impl Renderer {
    pub fn render_struct(&self, st: &Struct) -> String {
        let structs = &self.config.structs;
        let renamed = structs.rename(&st.name);
        let name = self.translate(renamed);

        let mut bases = match &st.base {
            Some(base) => self.translate(base),
            None if [st.name.as_str(), renamed, name.as_str()]
                .iter()
                .any(|n| structs.is_packed(n)) =>
            {
                structs.packed_base.clone()
            }
            None => "Structure".to_string(),
        };
        for mixin in structs.mixins_for(&name) {
            bases = format!("{}, {}", mixin, bases);
        }

        let mut w = CodeWriter::new();
        w.open(&format!("class {}({}):", name, bases));
        if let Some(doc) = &st.docstring {
            w.docstring(doc);
            w.blank();
        }
        if st.fields.is_empty() {
            w.writeln("_fields_ = []");
        } else {
            w.open("_fields_ = [");
            for field in &st.fields {
                w.writeln(&format!("(\"{}\", {}),", field.name, self.translate(&field.ty)));
            }
            w.close();
            w.writeln("]");
        }
        w.finish()
    }

    pub fn render_forward_declaration(&self, fwd: &StructureForwardDeclaration) -> String {
        let name = self.translate(self.config.structs.rename(&fwd.name));
        format!("class {}(Structure):\n    pass", name)
    }

    pub fn render_enum(&self, en: &EnumDecl) -> String {
        let mut lines = vec![format!("{} = ENUM_TYPE", en.name)];
        lines.extend(
            en.constants
                .iter()
                .map(|c| format!("{} = ENUM_VALUE_TYPE({})", c.name, c.value)),
        );
        lines.join("\n")
    }

    /// Empty when the alias and the translated original are identical.
    pub fn render_typedef(&self, td: &Typedef) -> String {
        let original = self.translate(&td.original);
        if td.name == original {
            return String::new();
        }
        format!("{} = {}", td.name, original)
    }

    pub fn render_constant(&self, constant: &ConstantDeclaration) -> String {
        match constant.docstring.as_deref().map(first_line) {
            Some(doc) if !doc.is_empty() => {
                format!("{} = {}  # {}", constant.name, constant.value, doc)
            }
            _ => format!("{} = {}", constant.name, constant.value),
        }
    }
}
