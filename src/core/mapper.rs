use crate::domain::model::{Employee, Person, RawLine};
use crate::domain::ports::LineMapper;
use crate::utils::error::ParseError;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

pub const EMPLOYEE_FIELDS: [&str; 5] = [
    "id_cliente",
    "nombre",
    "apellido",
    "email",
    "fecha_registro",
];

pub const PERSON_FIELDS: [&str; 9] = [
    "index",
    "userId",
    "firstName",
    "lastName",
    "gender",
    "email",
    "phone",
    "dateOfBirth",
    "jobTitle",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"))
}

/// Named, position-based view over one line, in the order the mapper declares.
struct FieldSet<'a> {
    line: &'a RawLine,
    names: &'a [&'a str],
}

impl<'a> FieldSet<'a> {
    fn new(line: &'a RawLine, names: &'a [&'a str]) -> Self {
        Self { line, names }
    }

    fn index_of(&self, name: &str) -> usize {
        self.names
            .iter()
            .position(|n| *n == name)
            .unwrap_or(usize::MAX)
    }

    /// `None` when the line stops before this field.
    fn read_string(&self, name: &str) -> Option<String> {
        self.line.field(self.index_of(name)).map(str::to_string)
    }

    fn read_long(&self, name: &str) -> Result<i64, ParseError> {
        let raw = self
            .line
            .field(self.index_of(name))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ParseError::new(self.line.line_number, name, "is required"))?;

        raw.parse::<i64>().map_err(|_| {
            ParseError::new(
                self.line.line_number,
                name,
                format!("'{}' is not an integer", raw),
            )
        })
    }

    /// Blank or missing dates are absent; anything else must be `YYYY-MM-DD`.
    fn read_date(&self, name: &str) -> Result<Option<NaiveDate>, ParseError> {
        let raw = match self.line.field(self.index_of(name)).map(str::trim) {
            None | Some("") => return Ok(None),
            Some(raw) => raw,
        };

        let invalid = || {
            ParseError::new(
                self.line.line_number,
                name,
                format!("'{}' is not a date in YYYY-MM-DD format", raw),
            )
        };

        if !date_pattern().is_match(raw) {
            return Err(invalid());
        }

        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| invalid())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmployeeLineMapper;

impl LineMapper<Employee> for EmployeeLineMapper {
    fn map_line(&self, line: &RawLine) -> Result<Employee, ParseError> {
        let fs = FieldSet::new(line, &EMPLOYEE_FIELDS);

        Ok(Employee {
            id: None,
            external_id: fs.read_long("id_cliente")?,
            first_name: fs.read_string("nombre"),
            last_name: fs.read_string("apellido"),
            email: fs.read_string("email"),
            registration_date: fs.read_date("fecha_registro")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PersonLineMapper;

impl LineMapper<Person> for PersonLineMapper {
    fn map_line(&self, line: &RawLine) -> Result<Person, ParseError> {
        if line.is_blank() {
            return Err(ParseError::new(line.line_number, "index", "line is empty"));
        }
        let fs = FieldSet::new(line, &PERSON_FIELDS);

        Ok(Person {
            id: None,
            index: fs.read_string("index"),
            user_id: fs.read_string("userId"),
            first_name: fs.read_string("firstName"),
            last_name: fs.read_string("lastName"),
            gender: fs.read_string("gender"),
            email: fs.read_string("email"),
            phone: fs.read_string("phone"),
            date_of_birth: fs.read_string("dateOfBirth"),
            job_title: fs.read_string("jobTitle"),
        })
    }
}
