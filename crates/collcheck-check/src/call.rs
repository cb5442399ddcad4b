use collcheck_types::{Span, Type};

/// A method invocation as handed over by the host type checker.
///
/// `erased_params` is the invoked method's declared parameter list (erased or not; the matcher
/// erases it), `args` the static types of the actual arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    pub receiver: Type,
    pub method: String,
    pub erased_params: Vec<Type>,
    pub args: Vec<Type>,
    pub span: Option<Span>,
}

impl CallSite {
    pub fn new(receiver: Type, method: impl Into<String>) -> Self {
        Self {
            receiver,
            method: method.into(),
            erased_params: Vec::new(),
            args: Vec::new(),
            span: None,
        }
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = Type>) -> Self {
        self.erased_params = params.into_iter().collect();
        self
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = Type>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}
