// Ordered name lists for subscribe / request-content
//
// A bare string is refused instead of being treated as a list of characters.
use crate::error::{Result, SessionError};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameList(Vec<String>);

impl NameList {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        NameList(names.iter().map(|n| n.as_ref().to_string()).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Conversion into a [`NameList`]. `argument` names the parameter in errors.
pub trait IntoNameList {
    fn into_name_list(self, argument: &'static str) -> Result<NameList>;
}

impl IntoNameList for NameList {
    fn into_name_list(self, _argument: &'static str) -> Result<NameList> {
        Ok(self)
    }
}

impl IntoNameList for &str {
    fn into_name_list(self, argument: &'static str) -> Result<NameList> {
        Err(SessionError::InvalidArgumentShape(argument))
    }
}

impl IntoNameList for String {
    fn into_name_list(self, argument: &'static str) -> Result<NameList> {
        Err(SessionError::InvalidArgumentShape(argument))
    }
}

impl IntoNameList for &String {
    fn into_name_list(self, argument: &'static str) -> Result<NameList> {
        Err(SessionError::InvalidArgumentShape(argument))
    }
}

impl<S: AsRef<str>> IntoNameList for &[S] {
    fn into_name_list(self, _argument: &'static str) -> Result<NameList> {
        Ok(NameList::new(self))
    }
}

impl<S: AsRef<str>> IntoNameList for Vec<S> {
    fn into_name_list(self, _argument: &'static str) -> Result<NameList> {
        Ok(NameList::new(&self))
    }
}

impl<S: AsRef<str>> IntoNameList for &Vec<S> {
    fn into_name_list(self, _argument: &'static str) -> Result<NameList> {
        Ok(NameList::new(self))
    }
}

impl<S: AsRef<str>, const N: usize> IntoNameList for [S; N] {
    fn into_name_list(self, _argument: &'static str) -> Result<NameList> {
        Ok(NameList::new(&self))
    }
}

impl<S: AsRef<str>, const N: usize> IntoNameList for &[S; N] {
    fn into_name_list(self, _argument: &'static str) -> Result<NameList> {
        Ok(NameList::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collections_convert() {
        let expected = NameList::new(&["a", "b"]);
        assert_eq!(expected.len(), 2);
        assert_eq!(["a", "b"].into_name_list("names").unwrap(), expected);
        assert_eq!(vec!["a".to_string(), "b".to_string()].into_name_list("names").unwrap(), expected);
        assert_eq!((&["a", "b"][..]).into_name_list("names").unwrap(), expected);
        assert!(Vec::<String>::new().into_name_list("names").unwrap().is_empty());
    }

    #[test]
    fn single_strings_are_refused() {
        assert!(matches!(
            "Comp1".into_name_list("names"),
            Err(SessionError::InvalidArgumentShape("names"))
        ));
        assert!(matches!(
            String::from("temp").into_name_list("variables"),
            Err(SessionError::InvalidArgumentShape("variables"))
        ));
    }
}
