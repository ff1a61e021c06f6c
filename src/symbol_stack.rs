/// A stack of named bindings split into lexical segments.
///
/// Lookups scan from the top, so the most recent declaration of a name wins.
/// [`SymbolStack::pop_segment`] drops exactly the bindings introduced since
/// the matching [`SymbolStack::push_segment`].
///
/// # Example
/// ```
/// use kvantum::symbol_stack::SymbolStack;
///
/// let mut symbols = SymbolStack::new();
/// symbols.push("x", 1);
/// symbols.push_segment([("x".to_string(), 2)]);
///
/// assert_eq!(symbols.get("x"), Some(&2));
/// assert!(symbols.is_declared_local("x"));
///
/// symbols.pop_segment();
/// assert_eq!(symbols.get("x"), Some(&1));
/// ```
#[derive(Debug, Clone)]
pub struct SymbolStack<T> {
    stack:    Vec<(String, T)>,
    segments: Vec<usize>,
}

impl<T> Default for SymbolStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SymbolStack<T> {
    /// Creates a stack with one open root segment.
    #[must_use]
    pub fn new() -> Self {
        Self { stack:    Vec::new(),
               segments: vec![0] }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.stack.iter().rposition(|(key, _)| key == name)
    }

    /// Returns `true` if `name` is bound in any open segment.
    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns `true` if the visible binding of `name` belongs to the
    /// innermost segment.
    #[must_use]
    pub fn is_declared_local(&self, name: &str) -> bool {
        let floor = self.segments.last().copied().unwrap_or(0);
        self.position(name).is_some_and(|position| position >= floor)
    }

    /// The visible binding of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.position(name).map(|position| &self.stack[position].1)
    }

    /// Mutable access to the visible binding of `name`.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.position(name).map(|position| &mut self.stack[position].1)
    }

    /// Binds `name` in the innermost segment.
    pub fn push(&mut self, name: impl Into<String>, value: T) {
        self.stack.push((name.into(), value));
    }

    /// Opens a segment seeded with `bindings`.
    pub fn push_segment(&mut self, bindings: impl IntoIterator<Item = (String, T)>) {
        self.segments.push(self.stack.len());
        self.stack.extend(bindings);
    }

    /// Closes the innermost segment and drops its bindings.
    pub fn pop_segment(&mut self) {
        let floor = self.segments.pop().unwrap_or(0);
        self.stack.truncate(floor);
    }

    /// Number of live bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_segment_restores_outer_bindings() {
        let mut symbols = SymbolStack::new();
        symbols.push("a", 'a');
        symbols.push_segment(Vec::new());
        symbols.push("b", 'b');
        symbols.push("a", 'c');

        assert_eq!(symbols.get("a"), Some(&'c'));
        symbols.pop_segment();

        assert_eq!(symbols.get("a"), Some(&'a'));
        assert!(!symbols.is_declared("b"));
        assert_eq!(symbols.len(), 1);
    }

    #[test]
    fn outer_bindings_are_not_local() {
        let mut symbols = SymbolStack::new();
        symbols.push("a", 0);
        symbols.push_segment(Vec::new());

        assert!(symbols.is_declared("a"));
        assert!(!symbols.is_declared_local("a"));

        symbols.push("a", 1);
        assert!(symbols.is_declared_local("a"));
    }

    #[test]
    fn get_mut_updates_the_visible_binding() {
        let mut symbols = SymbolStack::new();
        symbols.push("x", 1);
        symbols.push_segment([("x".to_string(), 2)]);

        if let Some(x) = symbols.get_mut("x") {
            *x = 5;
        }
        symbols.pop_segment();
        assert_eq!(symbols.get("x"), Some(&1));
    }

    #[test]
    fn popping_the_root_segment_empties_the_stack() {
        let mut symbols = SymbolStack::new();
        symbols.push("x", ());
        symbols.pop_segment();
        symbols.pop_segment();

        assert!(symbols.is_empty());
    }
}
