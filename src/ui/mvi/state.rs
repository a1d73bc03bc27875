/// Everything a view needs to render itself.
///
/// `Default` is the state before the view has been opened; reducers move
/// out of the current state with `mem::take` and return the next one.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}
