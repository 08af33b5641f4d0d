use crate::domain::model::{Employee, Person};
use crate::domain::ports::ItemProcessor;

fn upper(value: Option<String>) -> Option<String> {
    value.map(|v| v.to_uppercase())
}

/// Upper-cases first and last name; everything else passes through.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmployeeProcessor;

impl ItemProcessor<Employee> for EmployeeProcessor {
    fn process(&self, item: Employee) -> Option<Employee> {
        Some(Employee {
            first_name: upper(item.first_name),
            last_name: upper(item.last_name),
            ..item
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PersonProcessor;

impl ItemProcessor<Person> for PersonProcessor {
    fn process(&self, item: Person) -> Option<Person> {
        Some(Person {
            first_name: upper(item.first_name),
            last_name: upper(item.last_name),
            ..item
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mapper::EmployeeLineMapper;
    use crate::domain::model::RawLine;
    use crate::domain::ports::LineMapper;

    #[test]
    fn test_only_name_fields_change() {
        let raw = "7,maría,de la cruz,Maria.Cruz@Example.com,2023-12-31";
        let line = RawLine::new(2, raw.split(',').map(str::to_string).collect());
        let parsed = EmployeeLineMapper.map_line(&line).unwrap();

        let normalized = EmployeeProcessor.process(parsed.clone()).unwrap();

        assert_eq!(normalized.first_name.as_deref(), Some("MARÍA"));
        assert_eq!(normalized.last_name.as_deref(), Some("DE LA CRUZ"));
        assert_eq!(normalized.external_id, parsed.external_id);
        assert_eq!(normalized.email.as_deref(), Some("Maria.Cruz@Example.com"));
        assert_eq!(normalized.registration_date, parsed.registration_date);
    }

    #[test]
    fn test_absent_names_stay_absent() {
        let employee = Employee {
            id: None,
            external_id: 3,
            first_name: None,
            last_name: Some(String::new()),
            email: None,
            registration_date: None,
        };

        let normalized = EmployeeProcessor.process(employee).unwrap();
        assert_eq!(normalized.first_name, None);
        assert_eq!(normalized.last_name.as_deref(), Some(""));
    }

    #[test]
    fn test_absent_input_is_propagated() {
        assert_eq!(EmployeeProcessor.process_opt(None), None);
        assert_eq!(PersonProcessor.process_opt(None), None);
    }

    #[test]
    fn test_person_names_are_upper_cased() {
        let person = Person {
            first_name: Some("Shelby".to_string()),
            last_name: Some("Terrell".to_string()),
            gender: Some("Male".to_string()),
            ..Person::default()
        };

        let normalized = PersonProcessor.process_opt(Some(person)).unwrap();
        assert_eq!(normalized.first_name.as_deref(), Some("SHELBY"));
        assert_eq!(normalized.last_name.as_deref(), Some("TERRELL"));
        assert_eq!(normalized.gender.as_deref(), Some("Male"));
    }
}
