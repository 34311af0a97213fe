//! Macros for ergonomic capsule construction.

/// Build a capsule from an initial state and a transition list.
///
/// Expands to a [`CapsuleBuilder`](crate::builder::CapsuleBuilder) chain and
/// evaluates to `Result<Capsule<S, A>, BuildError>`.
///
/// # Example
///
/// ```
/// use capsule::capsule;
/// use capsule::core::Effect;
/// use capsule::effects::FanOutPolicy;
///
/// #[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// enum Door {
///     Open,
///     Close,
/// }
///
/// let door = capsule! {
///     initial: false,
///     fan_out: FanOutPolicy::BestEffort,
///     transitions: {
///         Door::Open => |_: &bool, _: &Door| Effect::pure(true),
///         Door::Close => |_: &bool, _: &Door| Effect::pure(false),
///     }
/// }
/// .unwrap();
///
/// assert!(!door.current());
/// assert_eq!(door.transitions().len(), 2);
/// ```
#[macro_export]
macro_rules! capsule {
    (
        initial: $initial:expr,
        $(fan_out: $policy:expr,)?
        transitions: {
            $($action:expr => $transition:expr),* $(,)?
        } $(,)?
    ) => {
        $crate::builder::CapsuleBuilder::new()
            .initial($initial)
            $(.fan_out($policy))?
            $(.on($action, $transition))*
            .build()
    };
}
