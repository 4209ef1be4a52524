//! # Argument Parsing
//!
//! A small interpreter over the argument schema declared in a command's manifest.
//! Turns the raw tokens after the command name into typed values, or into a
//! `ParseError` that is shown to the user together with the command's usage line.

use std::collections::{HashMap, HashSet};

use crate::application::errors::{ArgumentError, ParseError};
use crate::domain::traits::CommandManifest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    String,
    Integer,
    /// Only valid for flags: presence means `true`.
    Boolean,
    Choice(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKind {
    Positional,
    /// Swallows every remaining positional token, joined with spaces. Must be last.
    Rest,
    Flag { aliases: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub name: String,
    pub kind: ArgKind,
    pub value_type: ValueType,
    pub default: Option<ArgValue>,
    /// Positional that may be left out even without a default.
    pub optional: bool,
    pub help: Option<String>,
}

impl ArgumentSpec {
    pub fn positional(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            kind: ArgKind::Positional,
            value_type,
            default: None,
            optional: false,
            help: None,
        }
    }

    pub fn rest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ArgKind::Rest,
            value_type: ValueType::String,
            default: None,
            optional: false,
            help: None,
        }
    }

    pub fn flag(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            kind: ArgKind::Flag {
                aliases: Vec::new(),
            },
            value_type,
            default: None,
            optional: false,
            help: None,
        }
    }

    /// Adds an alternative token for a flag, e.g. `-c`. Ignored for positionals.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if let ArgKind::Flag { aliases } = &mut self.kind {
            aliases.push(alias.into());
        }
        self
    }

    pub fn default(mut self, value: ArgValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_flag(&self) -> bool {
        matches!(self.kind, ArgKind::Flag { .. })
    }

    pub fn is_required(&self) -> bool {
        !self.is_flag() && !self.optional && self.default.is_none()
    }

    fn flag_token(&self) -> String {
        format!("--{}", self.name)
    }

    fn matches_flag(&self, token: &str) -> bool {
        match &self.kind {
            ArgKind::Flag { aliases } => {
                token == self.flag_token() || aliases.iter().any(|a| a == token)
            }
            _ => false,
        }
    }

    fn placeholder(&self) -> String {
        match &self.value_type {
            ValueType::Choice(choices) => choices.join("|"),
            ValueType::Integer if self.is_flag() => "integer".to_string(),
            _ if self.is_flag() => "text".to_string(),
            _ => self.name.clone(),
        }
    }

    /// One usage fragment, e.g. `<sides>`, `[text...]` or `[--count|-c <integer>]`.
    pub fn usage(&self) -> String {
        match &self.kind {
            ArgKind::Positional if self.is_required() => format!("<{}>", self.placeholder()),
            ArgKind::Positional => format!("[{}]", self.placeholder()),
            ArgKind::Rest if self.is_required() => format!("<{}...>", self.name),
            ArgKind::Rest => format!("[{}...]", self.name),
            ArgKind::Flag { aliases } => {
                let mut names = self.flag_token();
                for alias in aliases {
                    names.push('|');
                    names.push_str(alias);
                }
                if self.value_type == ValueType::Boolean {
                    format!("[{names}]")
                } else {
                    format!("[{names} <{}>]", self.placeholder())
                }
            }
        }
    }

    /// Converts a raw token into this argument's type.
    pub fn coerce(&self, raw: &str) -> Result<ArgValue, ArgumentError> {
        match &self.value_type {
            ValueType::String => Ok(ArgValue::Str(raw.to_string())),
            ValueType::Integer => raw
                .parse::<i64>()
                .map(ArgValue::Int)
                .map_err(|_| ArgumentError::TypeError {
                    name: self.name.clone(),
                    expected: "an integer".to_string(),
                    value: raw.to_string(),
                }),
            ValueType::Boolean => match raw.to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(ArgValue::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(ArgValue::Bool(false)),
                _ => Err(ArgumentError::TypeError {
                    name: self.name.clone(),
                    expected: "true or false".to_string(),
                    value: raw.to_string(),
                }),
            },
            ValueType::Choice(choices) => choices
                .iter()
                .find(|c| c.eq_ignore_ascii_case(raw))
                .map(|c| ArgValue::Str(c.clone()))
                .ok_or_else(|| ArgumentError::InvalidChoice {
                    name: self.name.clone(),
                    value: raw.to_string(),
                    choices: choices.clone(),
                }),
        }
    }

    fn default_matches_type(&self) -> bool {
        match (&self.value_type, &self.default) {
            (_, None) => true,
            (ValueType::String, Some(ArgValue::Str(_))) => true,
            (ValueType::Integer, Some(ArgValue::Int(_))) => true,
            (ValueType::Boolean, Some(ArgValue::Bool(_))) => true,
            (ValueType::Choice(choices), Some(ArgValue::Str(s))) => choices.contains(s),
            _ => false,
        }
    }
}

/// Checks that an argument list forms a schema the parser can interpret unambiguously.
pub fn validate_arguments(arguments: &[ArgumentSpec]) -> Result<(), String> {
    let mut names = HashSet::new();
    let mut flag_tokens = HashSet::new();
    let mut seen_optional = false;
    let mut seen_rest = false;

    for spec in arguments {
        if spec.name.trim().is_empty() || spec.name.chars().any(char::is_whitespace) {
            return Err(format!("argument name `{}` is not a single word", spec.name));
        }
        if !names.insert(spec.name.as_str()) {
            return Err(format!("argument `{}` is declared twice", spec.name));
        }
        if let ValueType::Choice(choices) = &spec.value_type {
            if choices.is_empty() {
                return Err(format!("argument `{}` has no choices", spec.name));
            }
        }
        if !spec.default_matches_type() {
            return Err(format!("default of `{}` does not match its type", spec.name));
        }

        match &spec.kind {
            ArgKind::Flag { aliases } => {
                for token in std::iter::once(spec.flag_token()).chain(aliases.iter().cloned()) {
                    if !token.starts_with('-') || token.len() < 2 {
                        return Err(format!("flag alias `{token}` must start with `-`"));
                    }
                    if token == "--" {
                        return Err(format!("flag `{}` cannot use `--`, it ends the options", spec.name));
                    }
                    if !flag_tokens.insert(token.clone()) {
                        return Err(format!("flag token `{token}` is declared twice"));
                    }
                }
            }
            ArgKind::Positional | ArgKind::Rest => {
                if spec.value_type == ValueType::Boolean {
                    return Err(format!("positional `{}` cannot be boolean", spec.name));
                }
                if seen_rest {
                    return Err(format!("`{}` follows a rest argument", spec.name));
                }
                if spec.is_required() && seen_optional {
                    return Err(format!(
                        "required `{}` follows an optional argument",
                        spec.name
                    ));
                }
                seen_optional |= !spec.is_required();
                seen_rest |= spec.kind == ArgKind::Rest;
            }
        }
    }
    Ok(())
}

/// Typed values produced by a successful parse, keyed by argument name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    values: HashMap<String, ArgValue>,
}

impl ParsedArgs {
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Boolean flag value; absent flags read as `false`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(ArgValue::Bool(true)))
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Positional and flag specs derived from a manifest, in declaration order.
#[derive(Debug, Clone)]
pub struct Schema {
    command: String,
    positionals: Vec<ArgumentSpec>,
    flags: Vec<ArgumentSpec>,
}

impl Schema {
    pub fn from_manifest(manifest: &CommandManifest) -> Self {
        let (flags, positionals): (Vec<_>, Vec<_>) = manifest
            .arguments
            .iter()
            .cloned()
            .partition(ArgumentSpec::is_flag);
        Self {
            command: manifest.name.clone(),
            positionals,
            flags,
        }
    }

    pub fn arguments(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.positionals.iter().chain(self.flags.iter())
    }

    /// Usage summary without the command prefix, e.g. `roll [sides] [--count|-c <integer>]`.
    pub fn usage(&self) -> String {
        let mut usage = self.command.clone();
        for spec in self.arguments() {
            usage.push(' ');
            usage.push_str(&spec.usage());
        }
        usage
    }

    fn find_flag(&self, token: &str) -> Option<&ArgumentSpec> {
        self.flags.iter().find(|f| f.matches_flag(token))
    }

    fn error(&self, kind: ArgumentError) -> ParseError {
        ParseError {
            kind,
            usage: self.usage(),
        }
    }

    pub fn parse(&self, tokens: &[String]) -> Result<ParsedArgs, ParseError> {
        self.parse_inner(tokens).map_err(|kind| self.error(kind))
    }

    fn parse_inner(&self, tokens: &[String]) -> Result<ParsedArgs, ArgumentError> {
        let mut values = HashMap::new();
        let mut loose: Vec<&str> = Vec::new();
        let mut options_done = false;
        let mut iter = tokens.iter();

        while let Some(token) = iter.next() {
            if options_done {
                loose.push(token);
                continue;
            }
            if token == "--" {
                options_done = true;
                continue;
            }

            let (head, inline) = match token.split_once('=') {
                Some((head, value)) if token.starts_with("--") => (head, Some(value)),
                _ => (token.as_str(), None),
            };

            if let Some(spec) = self.find_flag(head) {
                let value = match (inline, &spec.value_type) {
                    (Some(raw), _) => spec.coerce(raw)?,
                    (None, ValueType::Boolean) => ArgValue::Bool(true),
                    (None, _) => {
                        let raw = iter
                            .next()
                            .ok_or_else(|| ArgumentError::MissingFlagValue(spec.flag_token()))?;
                        spec.coerce(raw)?
                    }
                };
                values.insert(spec.name.clone(), value);
            } else if head.starts_with("--") && head.len() > 2 {
                return Err(ArgumentError::UnknownFlag(head.to_string()));
            } else {
                loose.push(token);
            }
        }

        let mut loose = loose.into_iter();
        for spec in &self.positionals {
            let raw = match spec.kind {
                ArgKind::Rest => {
                    let rest: Vec<&str> = loose.by_ref().collect();
                    (!rest.is_empty()).then(|| rest.join(" "))
                }
                _ => loose.next().map(str::to_string),
            };

            match (raw, &spec.default) {
                (Some(raw), _) => {
                    values.insert(spec.name.clone(), spec.coerce(&raw)?);
                }
                (None, Some(default)) => {
                    values.insert(spec.name.clone(), default.clone());
                }
                (None, None) if spec.is_required() => {
                    return Err(ArgumentError::MissingArgument(spec.name.clone()));
                }
                (None, None) => {}
            }
        }

        if let Some(extra) = loose.next() {
            return Err(ArgumentError::UnexpectedArgument(extra.to_string()));
        }

        for spec in &self.flags {
            if values.contains_key(&spec.name) {
                continue;
            }
            match (&spec.default, &spec.value_type) {
                (Some(default), _) => {
                    values.insert(spec.name.clone(), default.clone());
                }
                (None, ValueType::Boolean) => {
                    values.insert(spec.name.clone(), ArgValue::Bool(false));
                }
                (None, _) => {}
            }
        }

        Ok(ParsedArgs { values })
    }
}

/// Splits command text on whitespace, keeping double-quoted spans together.
pub fn tokenize(input: &str) -> Result<Vec<String>, ArgumentError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_quotes {
        return Err(ArgumentError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &str) -> Vec<String> {
        tokenize(input).unwrap()
    }

    fn schema(arguments: Vec<ArgumentSpec>) -> Schema {
        let mut manifest = CommandManifest::new("test", "");
        manifest.arguments = arguments;
        validate_arguments(&manifest.arguments).unwrap();
        Schema::from_manifest(&manifest)
    }

    fn roll_schema() -> Schema {
        schema(vec![
            ArgumentSpec::positional("sides", ValueType::Integer).default(ArgValue::Int(6)),
            ArgumentSpec::flag("count", ValueType::Integer)
                .alias("-c")
                .default(ArgValue::Int(1)),
            ArgumentSpec::flag("verbose", ValueType::Boolean).alias("-v"),
        ])
    }

    #[test]
    fn test_integer_positional() {
        let s = schema(vec![ArgumentSpec::positional("x", ValueType::Integer)]);
        let args = s.parse(&toks("5")).unwrap();
        assert_eq!(args.int("x"), Some(5));

        let err = s.parse(&toks("abc")).unwrap_err();
        assert!(matches!(&err.kind, ArgumentError::TypeError { name, .. } if name == "x"));
        assert!(err.to_string().contains("`x`"));
        assert_eq!(err.usage, "test <x>");
    }

    #[test]
    fn test_missing_required_positional() {
        let s = schema(vec![
            ArgumentSpec::positional("target", ValueType::String),
            ArgumentSpec::positional("amount", ValueType::Integer),
        ]);
        let err = s.parse(&toks("alice")).unwrap_err();
        assert_eq!(err.kind, ArgumentError::MissingArgument("amount".to_string()));
    }

    #[test]
    fn test_defaults_for_absent_values() {
        let args = roll_schema().parse(&[]).unwrap();
        assert_eq!(args.int("sides"), Some(6));
        assert_eq!(args.int("count"), Some(1));
        assert!(!args.flag("verbose"));
    }

    #[test]
    fn test_optional_positional_without_default() {
        let s = schema(vec![ArgumentSpec::positional("topic", ValueType::String).optional()]);
        assert_eq!(s.parse(&[]).unwrap().str("topic"), None);
        assert_eq!(s.parse(&toks("roll")).unwrap().str("topic"), Some("roll"));
        assert_eq!(s.usage(), "test [topic]");
    }

    #[test]
    fn test_flags_long_alias_and_inline() {
        let s = roll_schema();

        let args = s.parse(&toks("20 --count 3")).unwrap();
        assert_eq!(args.int("sides"), Some(20));
        assert_eq!(args.int("count"), Some(3));

        let args = s.parse(&toks("-c 2 -v 12")).unwrap();
        assert_eq!(args.int("count"), Some(2));
        assert_eq!(args.int("sides"), Some(12));
        assert!(args.flag("verbose"));

        let args = s.parse(&toks("--count=4")).unwrap();
        assert_eq!(args.int("count"), Some(4));
    }

    #[test]
    fn test_flag_errors() {
        let s = roll_schema();
        assert_eq!(
            s.parse(&toks("--count")).unwrap_err().kind,
            ArgumentError::MissingFlagValue("--count".to_string())
        );
        assert_eq!(
            s.parse(&toks("--nope")).unwrap_err().kind,
            ArgumentError::UnknownFlag("--nope".to_string())
        );
        assert!(matches!(
            s.parse(&toks("--count many")).unwrap_err().kind,
            ArgumentError::TypeError { .. }
        ));
    }

    #[test]
    fn test_negative_number_is_positional() {
        let s = schema(vec![ArgumentSpec::positional("n", ValueType::Integer)]);
        assert_eq!(s.parse(&toks("-3")).unwrap().int("n"), Some(-3));
    }

    #[test]
    fn test_choice_validation() {
        let s = schema(vec![ArgumentSpec::positional(
            "move",
            ValueType::Choice(vec!["rock".into(), "paper".into(), "scissors".into()]),
        )]);

        assert_eq!(s.parse(&toks("Paper")).unwrap().str("move"), Some("paper"));

        let err = s.parse(&toks("lizard")).unwrap_err();
        assert!(matches!(err.kind, ArgumentError::InvalidChoice { .. }));
        assert!(err.to_string().contains("rock, paper, scissors"));
        assert_eq!(err.usage, "test <rock|paper|scissors>");
    }

    #[test]
    fn test_rest_argument_and_extra_tokens() {
        let s = schema(vec![
            ArgumentSpec::rest("text"),
            ArgumentSpec::flag("loud", ValueType::Boolean).alias("-l"),
        ]);
        let args = s.parse(&toks("hello there -l world")).unwrap();
        assert_eq!(args.str("text"), Some("hello there world"));
        assert!(args.flag("loud"));

        let s = schema(vec![ArgumentSpec::positional("one", ValueType::String)]);
        assert_eq!(
            s.parse(&toks("a b")).unwrap_err().kind,
            ArgumentError::UnexpectedArgument("b".to_string())
        );
    }

    #[test]
    fn test_double_dash_ends_options() {
        let s = schema(vec![ArgumentSpec::rest("text")]);
        let args = s.parse(&toks("-- --not-a-flag")).unwrap();
        assert_eq!(args.str("text"), Some("--not-a-flag"));
    }

    #[test]
    fn test_no_arguments() {
        let s = schema(vec![]);
        assert!(s.parse(&[]).unwrap().is_empty());
        assert_eq!(s.usage(), "test");
    }

    #[test]
    fn test_usage_line() {
        assert_eq!(
            roll_schema().usage(),
            "test [sides] [--count|-c <integer>] [--verbose|-v]"
        );
    }

    #[test]
    fn test_tokenize_quotes() {
        assert_eq!(toks("  a  \"b c\" d"), vec!["a", "b c", "d"]);
        assert_eq!(toks("\"\""), vec![""]);
        assert_eq!(tokenize("\"open"), Err(ArgumentError::UnterminatedQuote));
    }

    #[test]
    fn test_schema_validation() {
        let bad_order = [
            ArgumentSpec::positional("a", ValueType::String).default(ArgValue::Str("x".into())),
            ArgumentSpec::positional("b", ValueType::String),
        ];
        assert!(validate_arguments(&bad_order).is_err());

        let bad_default =
            [ArgumentSpec::positional("n", ValueType::Integer).default(ArgValue::Str("1".into()))];
        assert!(validate_arguments(&bad_default).is_err());

        let bad_choice = [ArgumentSpec::positional("c", ValueType::Choice(vec![]))];
        assert!(validate_arguments(&bad_choice).is_err());

        let bad_alias = [ArgumentSpec::flag("f", ValueType::Boolean).alias("x")];
        assert!(validate_arguments(&bad_alias).is_err());

        let options_end_alias = [ArgumentSpec::flag("f", ValueType::Boolean).alias("--")];
        assert!(validate_arguments(&options_end_alias).is_err());

        let bool_positional = [ArgumentSpec::positional("b", ValueType::Boolean)];
        assert!(validate_arguments(&bool_positional).is_err());

        let after_rest = [
            ArgumentSpec::rest("text"),
            ArgumentSpec::positional("x", ValueType::String).default(ArgValue::Str("y".into())),
        ];
        assert!(validate_arguments(&after_rest).is_err());
    }
}
