/// What a component did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed with nothing for the parent to do
  Handled,
  /// Consumed; the parent should act on this event
  Event(T),
  /// Not consumed; the parent should try its own bindings
  NotHandled,
}

