#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Expression {
    pub value: String,
}

impl Expression {
    pub fn new(value: impl Into<String>) -> Self {
        Expression {
            value: value.into(),
        }
    }
}
