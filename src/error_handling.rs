use thiserror::Error;

/// Why an arithmetic expression could not be turned into a number.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("invalid character, '{0}', encountered")]
    invalid_character(char),

    #[error("'{0}' is not a valid number")]
    invalid_number(String),

    #[error("the '{0}' operator has been misplaced")]
    invalid_operator(String),

    #[error("did not expect '{0}'")]
    did_not_expect(String),

    #[error("could not find '{0}'")]
    could_not_find(String),

    #[error("identifier, '{0}', is not defined")]
    undefined(String),

    #[error("expression ended abruptly")]
    abrupt_end,

    #[error("division by zero")]
    division_by_zero,

    #[error("'{name}' takes {expected} argument(s) but {found} were given")]
    wrong_arity {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("math domain error in '{0}'")]
    domain(String),

    #[error("'{0}' is a function and must be called")]
    not_a_value(String),

    #[error("'{0}' is a value and cannot be called")]
    not_callable(String),

    #[error("call depth exceeded while evaluating '{0}'")]
    recursion_limit(String),

    #[error("could not convert result to a number")]
    not_a_number,

    #[error("expression nests too deeply")]
    too_deep,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("invalid variable or function name '{0}'")]
    invalid_name(String),

    #[error("invalid function definition - {0}")]
    invalid_definition(EvalError),

    #[error("invalid syntax, expected '{0}'")]
    invalid_syntax(&'static str),

    #[error("invalid variable '{0}'")]
    invalid_variable(String),

    #[error("function '{0}' not defined")]
    undefined_function(String),

    #[error("unable to fetch exchange rate for {from} to {to}")]
    conversion_unavailable { from: String, to: String },

    #[error("unsupported unit conversion '{0}'")]
    unsupported_conversion(String),

    #[error(transparent)]
    evaluation(#[from] EvalError),

    #[error("no x found with {name}(x) = {target} after {steps} steps")]
    root_not_found {
        name: String,
        target: String,
        steps: usize,
    },
}

pub type Result<T> = std::result::Result<T, CalcError>;
