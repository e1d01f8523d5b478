use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use crate::config::{is_go_identifier, Config};
use crate::naming::NameTransform;
use crate::schema::ColumnDescriptor;
use crate::tag::TagPolicy;
use crate::typemap::{TargetType, TypeMap};

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedField {
    pub name: String,
    pub ty: TargetType,
    /// Complete struct tag including the surrounding backticks.
    pub tag: String,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedType {
    pub name: String,
    /// The table name as the catalog reports it, prefix included.
    pub table_name: String,
    pub fields: Vec<GeneratedField>,
    pub real_name_method: Option<String>,
    /// Name of the integer field that `GenId` and the unmarshal hooks populate.
    ///
    /// `None` when the table has no `util.Long` field named `identity_field`. Then only a
    /// plain `New<T>()` is rendered, without `GenId` or the JSON/XML hooks, since those
    /// assign `util.NextId()` to the field and would not compile without it.
    pub identity: Option<String>,
}

/// A rendered Go source file for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoFile {
    pub type_name: String,
    pub source: String,
}

impl GoFile {
    pub fn file_name(&self) -> String {
        format!("{}.go", self.type_name)
    }
}

/// Builds and renders one Go type per table. Holds only borrowed, read-only state.
pub struct Emitter<'a> {
    config: &'a Config,
    types: TypeMap,
    names: NameTransform<'a>,
    tags: TagPolicy<'a>,
}

impl<'a> Emitter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            types: TypeMap::new(config.temporal_mode()),
            names: NameTransform::new(&config.prefix, &config.naming),
            tags: TagPolicy::new(&config.tags),
        }
    }

    /// Returns `None` when the table name transforms to nothing (e.g. it equals the prefix).
    pub fn build(&self, table: &str, columns: &[ColumnDescriptor]) -> Option<GeneratedType> {
        let name = valid_identifier(table, table, self.names.transform(table));
        if name.is_empty() {
            tracing::warn!(table, prefix = %self.config.prefix, "Table name is empty after transformation, skipping");
            return None;
        }
        let fields = columns
            .iter()
            .enumerate()
            .map(|(i, c)| self.field(table, i, c))
            .collect::<Vec<_>>();

        let mut seen = HashSet::new();
        for f in &fields {
            if !seen.insert(f.name.as_str()) {
                tracing::warn!(table, field = %f.name, "Several columns map to the same field name");
            }
        }

        let identity = fields
            .iter()
            .find(|f| f.name == self.config.identity_field && f.ty == TargetType::Long)
            .map(|f| f.name.clone());
        if identity.is_none() {
            tracing::debug!(table, identity = %self.config.identity_field, "No integer identity field, skipping id hooks");
        }
        Some(GeneratedType {
            name,
            table_name: table.to_string(),
            fields,
            real_name_method: self.config.real_name_method().map(str::to_string),
            identity,
        })
    }

    fn field(&self, table: &str, position: usize, column: &ColumnDescriptor) -> GeneratedField {
        let mut name = valid_identifier(table, &column.name, self.names.transform(&column.name));
        if name.is_empty() {
            name = format!("Column{}", position + 1);
            tracing::warn!(table, column = %column.name, field = %name, "Column name is empty after transformation");
        }
        let ty = self.types.map(&column.data_type);
        let mut comment = single_line(&column.comment);
        if let TargetType::Unmapped(source) = &ty {
            tracing::warn!(table, column = %column.name, data_type = %source, "No Go type for column type");
            let note = format!("unmapped: {source}");
            comment = if comment.is_empty() { note } else { format!("{comment} ({note})") };
        }
        let tag = self.tags.render(&column.name, &name);
        tracing::debug!(table, column = %column.name, field = %name, ty = %ty, "Mapped column");
        GeneratedField { name, ty, tag, comment }
    }

    pub fn render(&self, ty: &GeneratedType) -> GoFile {
        let source = GoSource { config: self.config, ty }.to_string();
        GoFile {
            type_name: ty.name.clone(),
            source,
        }
    }
}

/// Returns `generated` unchanged when it is a Go identifier (or empty), else a repaired copy.
fn valid_identifier(table: &str, raw: &str, generated: String) -> String {
    if generated.is_empty() || is_go_identifier(&generated) {
        return generated;
    }
    let fixed = go_identifier(&generated);
    tracing::warn!(table, name = %raw, generated = %generated, fixed = %fixed, "Generated name is not a Go identifier");
    fixed
}

/// Drops characters Go does not allow in identifiers, upper-casing the character after each
/// dropped run, and puts `X` before a leading digit. `Order-id` → `OrderId`, `2faCodes` → `X2faCodes`.
fn go_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    let mut upper_next = false;
    for c in name.chars() {
        if c != '_' && !c.is_alphanumeric() {
            upper_next = true;
            continue;
        }
        if out.is_empty() && c.is_numeric() {
            out.push('X');
        }
        if upper_next {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper_next = false;
    }
    out
}

fn single_line(s: &str) -> String {
    s.split(['\r', '\n']).map(str::trim).filter(|s| !s.is_empty()).join(" ")
}

/// Go string literal for `s`.
fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

struct GoSource<'a> {
    config: &'a Config,
    ty: &'a GeneratedType,
}

impl GoSource<'_> {
    fn field_section(&self) -> String {
        self.ty
            .fields
            .iter()
            .map(|f| {
                let mut line = format!("\t{} {} {}", f.name, f.ty, f.tag);
                if !f.comment.is_empty() {
                    line.push_str(" // ");
                    line.push_str(&f.comment);
                }
                line
            })
            .join("\n")
    }

    /// Standard library imports first, then the helper packages. Type imports are inferred
    /// from the text of the field section alone.
    fn imports(&self, fields: &str) -> (Vec<&str>, Vec<&str>) {
        let hooks = self.ty.identity.is_some();
        let mut stdlib = Vec::new();
        if hooks {
            stdlib.push("encoding/json");
            stdlib.push("encoding/xml");
        }
        if fields.contains(TargetType::Time.go_type()) {
            stdlib.push("time");
        }
        let mut helpers = Vec::new();
        if hooks || fields.contains(TargetType::Long.go_type()) {
            helpers.push(self.config.imports.util.as_str());
        }
        if fields.contains(TargetType::Datetime.go_type()) {
            helpers.push(self.config.imports.date.as_str());
        }
        (stdlib, helpers)
    }

    fn write_unmarshal_hook(&self, f: &mut Formatter<'_>, identity: &str, signature: &str, decode: &str, doc: &str) -> fmt::Result {
        let name = &self.ty.name;
        writeln!(f, "// {doc}")?;
        writeln!(f, "func (that *{name}) {signature} error {{")?;
        writeln!(f, "\ttype Alias {name}")?;
        writeln!(f, "\talias := &struct {{")?;
        writeln!(f, "\t\t*Alias")?;
        writeln!(f, "\t}}{{Alias: (*Alias)(that)}}")?;
        writeln!(f, "\tif err := {decode}; err != nil {{")?;
        writeln!(f, "\t\treturn err")?;
        writeln!(f, "\t}}")?;
        writeln!(f, "\tif alias.{identity} == 0 {{")?;
        writeln!(f, "\t\talias.{identity} = util.NextId()")?;
        writeln!(f, "\t}}")?;
        writeln!(f, "\treturn nil")?;
        writeln!(f, "}}")
    }
}

impl Display for GoSource<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = &self.ty.name;
        let fields = self.field_section();

        writeln!(f, "package {}", self.config.package_name)?;
        writeln!(f)?;

        let (stdlib, helpers) = self.imports(&fields);
        if !stdlib.is_empty() || !helpers.is_empty() {
            writeln!(f, "import (")?;
            for path in &stdlib {
                writeln!(f, "\t{}", go_quote(path))?;
            }
            if !stdlib.is_empty() && !helpers.is_empty() {
                writeln!(f)?;
            }
            for path in &helpers {
                writeln!(f, "\t{}", go_quote(path))?;
            }
            writeln!(f, ")")?;
            writeln!(f)?;
        }

        writeln!(f, "type {name} struct {{")?;
        if !fields.is_empty() {
            writeln!(f, "{fields}")?;
        }
        writeln!(f, "}}")?;

        if let Some(method) = &self.ty.real_name_method {
            writeln!(f)?;
            writeln!(f, "func ({name}) {method}() string {{")?;
            writeln!(f, "\treturn {}", go_quote(&self.ty.table_name))?;
            writeln!(f, "}}")?;
        }

        writeln!(f)?;
        writeln!(f, "func New{name}() {name} {{")?;
        let Some(identity) = self.ty.identity.as_deref() else {
            writeln!(f, "\treturn {name}{{}}")?;
            return writeln!(f, "}}");
        };
        writeln!(f, "\tthat := {name}{{}}")?;
        writeln!(f, "\tthat.GenId()")?;
        writeln!(f, "\treturn that")?;
        writeln!(f, "}}")?;
        writeln!(f)?;

        writeln!(f, "func (that *{name}) GenId() {{")?;
        writeln!(f, "\tthat.{identity} = util.NextId()")?;
        writeln!(f, "}}")?;
        writeln!(f)?;

        self.write_unmarshal_hook(
            f,
            identity,
            "UnmarshalJSON(value []byte)",
            "json.Unmarshal(value, alias)",
            &format!("UnmarshalJSON assigns a new {identity} when the document does not carry one."),
        )?;
        writeln!(f)?;
        self.write_unmarshal_hook(
            f,
            identity,
            "UnmarshalXML(d *xml.Decoder, start xml.StartElement)",
            "d.DecodeElement(alias, &start)",
            &format!("UnmarshalXML assigns a new {identity} when the document does not carry one."),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TagConfig;
    use crate::schema::tests::column;

    fn user_columns() -> Vec<ColumnDescriptor> {
        vec![
            column("t_user", "id", "int", ""),
            column("t_user", "user_name", "varchar", "name"),
            column("t_user", "created_at", "datetime", ""),
        ]
    }

    fn user_config() -> Config {
        Config {
            prefix: "t_".to_string(),
            real_name_method: Some("TableName".to_string()),
            tags: TagConfig {
                json_tag: true,
                ..TagConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_build_user() {
        let config = user_config();
        let emitter = Emitter::new(&config);
        let ty = emitter.build("t_user", &user_columns()).unwrap();
        assert_eq!(ty.name, "User");
        assert_eq!(ty.table_name, "t_user");
        assert_eq!(ty.identity.as_deref(), Some("Id"));
        let names = ty.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["Id", "UserName", "CreatedAt"]);
        assert_eq!(ty.fields[0].ty, TargetType::Long);
        assert_eq!(ty.fields[1].tag, "`xorm:\"user_name\" json:\"userName\"`");
        assert_eq!(ty.fields[1].comment, "name");
        assert_eq!(ty.fields[2].ty, TargetType::Datetime);
    }

    #[test]
    fn test_render_user() {
        let config = user_config();
        let emitter = Emitter::new(&config);
        let file = emitter.render(&emitter.build("t_user", &user_columns()).unwrap());
        assert_eq!(file.file_name(), "User.go");
        let src = &file.source;
        assert!(src.starts_with("package model\n\nimport (\n\t\"encoding/json\"\n\t\"encoding/xml\"\n\n\t\"clc.com/go_bi/util\"\n\t\"clc.com/go_bi/util/date\"\n)\n"));
        assert!(src.contains("type User struct {\n\tId util.Long `xorm:\"id\" json:\"id\"`\n"));
        assert!(src.contains("\tUserName string `xorm:\"user_name\" json:\"userName\"` // name\n"));
        assert!(src.contains("\tCreatedAt date.Datetime `xorm:\"created_at\" json:\"createdAt\"`\n}\n"));
        assert!(src.contains("func (User) TableName() string {\n\treturn \"t_user\"\n}\n"));
        assert!(src.contains("func NewUser() User {\n\tthat := User{}\n\tthat.GenId()\n\treturn that\n}\n"));
        assert!(src.contains("func (that *User) GenId() {\n\tthat.Id = util.NextId()\n}\n"));
        assert!(src.contains("func (that *User) UnmarshalJSON(value []byte) error {"));
        assert!(src.contains("func (that *User) UnmarshalXML(d *xml.Decoder, start xml.StartElement) error {"));
        assert_eq!(src.matches("alias.Id = util.NextId()").count(), 2);
    }

    #[test]
    fn test_accessor_omitted_without_method_name() {
        let config = Config {
            prefix: "t_".to_string(),
            ..Config::default()
        };
        let emitter = Emitter::new(&config);
        let ty = emitter.build("t_user", &user_columns()).unwrap();
        assert!(ty.real_name_method.is_none());
        let src = emitter.render(&ty).source;
        assert!(!src.contains("func (User)"));
        assert!(!src.contains("t_user"));
    }

    #[test]
    fn test_zero_columns() {
        let config = Config::default();
        let emitter = Emitter::new(&config);
        let ty = emitter.build("audit", &[]).unwrap();
        assert!(ty.fields.is_empty());
        assert!(ty.identity.is_none());
        let src = emitter.render(&ty).source;
        assert_eq!(src, "package model\n\ntype Audit struct {\n}\n\nfunc NewAudit() Audit {\n\treturn Audit{}\n}\n");
    }

    #[test]
    fn test_imports_follow_field_types() {
        let config = Config::default();
        let emitter = Emitter::new(&config);
        let ty = emitter
            .build("label", &[column("label", "title", "varchar", ""), column("label", "weight", "double", "")])
            .unwrap();
        let src = emitter.render(&ty).source;
        assert!(!src.contains("import"));
        assert!(!src.contains("GenId"));

        let ty = emitter
            .build("label", &[column("label", "code", "varchar", ""), column("label", "count", "bigint", "")])
            .unwrap();
        let src = emitter.render(&ty).source;
        assert!(src.contains("import (\n\t\"clc.com/go_bi/util\"\n)\n"));
        assert!(!src.contains("encoding/json"));
    }

    #[test]
    fn test_native_time_imports_time() {
        let config = Config {
            native_time: true,
            ..Config::default()
        };
        let emitter = Emitter::new(&config);
        let ty = emitter.build("event", &[column("event", "at", "timestamp", "")]).unwrap();
        let src = emitter.render(&ty).source;
        assert!(src.contains("\tAt time.Time `xorm:\"at\"`\n"));
        assert!(src.contains("import (\n\t\"time\"\n)\n"));
        assert!(!src.contains("date"));
    }

    #[test]
    fn test_unmapped_type_is_visible() {
        let config = Config::default();
        let emitter = Emitter::new(&config);
        let ty = emitter
            .build("place", &[column("place", "location", "geometry", "where"), column("place", "shape", "polygon", "")])
            .unwrap();
        assert!(ty.fields[0].ty.is_unmapped());
        let src = emitter.render(&ty).source;
        assert!(src.contains("\tLocation interface{} `xorm:\"location\"` // where (unmapped: geometry)\n"));
        assert!(src.contains("\tShape interface{} `xorm:\"shape\"` // unmapped: polygon\n"));
    }

    #[test]
    fn test_identity_must_be_integer() {
        let config = Config::default();
        let emitter = Emitter::new(&config);
        let ty = emitter.build("token", &[column("token", "id", "varchar", "")]).unwrap();
        assert!(ty.identity.is_none());
        let src = emitter.render(&ty).source;
        assert!(!src.contains("util.NextId"));
        assert!(!src.contains("GenId") && !src.contains("UnmarshalJSON") && !src.contains("UnmarshalXML"));
        assert!(src.contains("func NewToken() Token {\n\treturn Token{}\n}\n"));
    }

    #[test]
    fn test_empty_names() {
        let config = Config {
            prefix: "t_".to_string(),
            ..Config::default()
        };
        let emitter = Emitter::new(&config);
        assert!(emitter.build("t_", &[]).is_none());
        let ty = emitter.build("t_misc", &[column("t_misc", "_", "int", "")]).unwrap();
        assert_eq!(ty.fields[0].name, "Column1");
    }

    #[test]
    fn test_names_are_go_identifiers() {
        let config = Config::default();
        let emitter = Emitter::new(&config);
        let columns = [
            column("2fa_codes", "2nd_factor", "int", ""),
            column("2fa_codes", "order-id", "int", ""),
            column("2fa_codes", "first name", "int", ""),
        ];
        let ty = emitter.build("2fa_codes", &columns).unwrap();
        assert_eq!(ty.name, "X2faCodes");
        let names = ty.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["X2ndFactor", "OrderId", "FirstName"]);

        let src = emitter.render(&ty).source;
        assert!(src.contains("type X2faCodes struct {\n"));
        assert!(src.contains("\tX2ndFactor util.Long `xorm:\"2nd_factor\"`\n"));
        assert!(src.contains("\tOrderId util.Long `xorm:\"order-id\"`\n"));
        assert!(src.contains("\tFirstName util.Long `xorm:\"first name\"`\n"));
        assert!(src.contains("func NewX2faCodes() X2faCodes {"));
    }

    #[test]
    fn test_unusable_names() {
        let config = Config::default();
        let emitter = Emitter::new(&config);
        assert!(emitter.build("---", &[]).is_none());
        let ty = emitter.build("misc", &[column("misc", "%", "int", "")]).unwrap();
        assert_eq!(ty.fields[0].name, "Column1");
    }

    #[test]
    fn test_go_identifier() {
        assert_eq!(go_identifier("Order-id"), "OrderId");
        assert_eq!(go_identifier("2faCodes"), "X2faCodes");
        assert_eq!(go_identifier("-Price ($)"), "Price");
        assert_eq!(go_identifier("Größe"), "Größe");
        assert_eq!(go_identifier("--"), "");
    }

    #[test]
    fn test_comment_is_single_line() {
        let config = Config::default();
        let emitter = Emitter::new(&config);
        let ty = emitter.build("doc", &[column("doc", "body", "text", "first\r\nsecond\n")]).unwrap();
        assert_eq!(ty.fields[0].comment, "first second");
    }

    #[test]
    fn test_go_quote() {
        assert_eq!(go_quote("t_user"), "\"t_user\"");
        assert_eq!(go_quote("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }
}
