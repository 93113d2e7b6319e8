/// Builder setters that write through to a request's `query` field.
///
/// `opt name: T` fills an `Option<T>` field from anything `Into<T>`.
macro_rules! query_setters {
    () => {};

    (opt $name:ident : $ty:ty $(, $($rest:tt)*)?) => {
        pub fn $name(mut self, $name: impl Into<$ty>) -> Self {
            self.query.$name = Some($name.into());
            self
        }

        $(query_setters!($($rest)*);)?
    };

    ($name:ident : $ty:ty $(, $($rest:tt)*)?) => {
        pub fn $name(mut self, $name: $ty) -> Self {
            self.query.$name = $name;
            self
        }

        $(query_setters!($($rest)*);)?
    };
}

pub(crate) use query_setters;
