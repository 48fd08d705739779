use ems_core::forms::{FieldType, FormTemplateId};
use std::fmt;

/// An edit typed into the form builder screen.
///
/// Field numbers are 1-based as displayed and converted to 0-based indexes
/// during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuilderCommand {
    /// Append a blank text field
    Add,
    /// Remove the field at an index
    Remove(usize),
    /// Move a field to another position
    Move { from: usize, to: usize },
    /// Rename a field
    Label { index: usize, label: String },
    /// Change a field's type
    Type { index: usize, field_type: FieldType },
    /// Flip a field's required flag
    ToggleRequired(usize),
    /// Replace a select/radio field's options
    Options { index: usize, options: Vec<String> },
    /// Rename the form
    Name(String),
    /// List saved templates
    List,
    /// Load a saved template for reordering
    Open(FormTemplateId),
    /// Create the template, or save the new order of a loaded one
    Save,
    /// Discard everything and start over
    Reset,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Command given without its required arguments.
    MissingArgument { usage: &'static str },
    /// Field number that isn't a positive integer.
    InvalidFieldNumber(String),
    /// Unknown field type name.
    InvalidFieldType(String),
    /// Template id that isn't an integer.
    InvalidTemplateId(String),
    /// Options list with no non-blank entries.
    EmptyOptions,
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument { usage } => write!(f, "Missing argument. Usage: {}", usage),
            Self::InvalidFieldNumber(value) => write!(
                f,
                "Invalid field number '{}'. Use the number shown next to the field (e.g., 'rm 2')",
                value
            ),
            Self::InvalidFieldType(value) => write!(
                f,
                "Unknown field type '{}'. Expected one of: {}",
                value,
                FieldType::ALL.map(|t| t.as_str()).join(", ")
            ),
            Self::InvalidTemplateId(value) => {
                write!(f, "Invalid template id '{}' (e.g., 'open 3')", value)
            }
            Self::EmptyOptions => write!(
                f,
                "Options must be a comma-separated list (e.g., 'opts 2 Sales,Engineering')"
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Press Tab to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a form builder command.
///
/// # Examples
///
/// ```
/// use ems_client::commands::{BuilderCommand, parse_command};
///
/// assert_eq!(parse_command("add"), Ok(BuilderCommand::Add));
/// assert_eq!(parse_command("mv 3 1"), Ok(BuilderCommand::Move { from: 2, to: 0 }));
/// assert_eq!(
///     parse_command("label 1 Full Name"),
///     Ok(BuilderCommand::Label { index: 0, label: "Full Name".to_string() })
/// );
/// ```
pub fn parse_command(input: &str) -> Result<BuilderCommand, ParseError> {
    let trimmed = input.trim();

    // Single-word commands first
    match trimmed {
        "add" => return Ok(BuilderCommand::Add),
        "list" | "ls" => return Ok(BuilderCommand::List),
        "save" => return Ok(BuilderCommand::Save),
        "reset" => return Ok(BuilderCommand::Reset),
        _ => {}
    }

    let (command, rest) = split_word(trimmed);
    match command {
        "rm" => Ok(BuilderCommand::Remove(parse_field_number(rest, "rm N")?)),
        "mv" => {
            let (from, to) = split_word(rest);
            Ok(BuilderCommand::Move {
                from: parse_field_number(from, "mv FROM TO")?,
                to: parse_field_number(to, "mv FROM TO")?,
            })
        }
        "label" => {
            let (index, label) = split_word(rest);
            let index = parse_field_number(index, "label N TEXT")?;
            if label.is_empty() {
                return Err(ParseError::MissingArgument {
                    usage: "label N TEXT",
                });
            }
            Ok(BuilderCommand::Label {
                index,
                label: label.to_string(),
            })
        }
        "type" => {
            let (index, field_type) = split_word(rest);
            let index = parse_field_number(index, "type N TYPE")?;
            if field_type.is_empty() {
                return Err(ParseError::MissingArgument {
                    usage: "type N TYPE",
                });
            }
            let field_type = field_type
                .parse::<FieldType>()
                .map_err(|_| ParseError::InvalidFieldType(field_type.to_string()))?;
            Ok(BuilderCommand::Type { index, field_type })
        }
        "req" => Ok(BuilderCommand::ToggleRequired(parse_field_number(
            rest, "req N",
        )?)),
        "opts" => {
            let (index, options) = split_word(rest);
            let index = parse_field_number(index, "opts N a,b,c")?;
            let options: Vec<String> = options
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
            if options.is_empty() {
                return Err(ParseError::EmptyOptions);
            }
            Ok(BuilderCommand::Options { index, options })
        }
        "name" if !rest.is_empty() => Ok(BuilderCommand::Name(rest.to_string())),
        "name" => Err(ParseError::MissingArgument { usage: "name TEXT" }),
        "open" if rest.is_empty() => Err(ParseError::MissingArgument { usage: "open ID" }),
        "open" => rest
            .parse::<FormTemplateId>()
            .map(BuilderCommand::Open)
            .map_err(|_| ParseError::InvalidTemplateId(rest.to_string())),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Split off the first whitespace-delimited word, trimming the remainder.
fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

/// Parse a 1-based field number into a 0-based index.
fn parse_field_number(value: &str, usage: &'static str) -> Result<usize, ParseError> {
    if value.is_empty() {
        return Err(ParseError::MissingArgument { usage });
    }
    match value.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(ParseError::InvalidFieldNumber(value.to_string())),
    }
}
