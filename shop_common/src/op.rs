//! Operator boilerplate for single-field newtypes.
//!
//! ```ignore
//! op!(binary Money, Add, add);
//! op!(inplace Money, AddAssign, add_assign);
//! op!(unary Money, Neg, neg);
//! ```

#[macro_export]
macro_rules! op {
    (binary $name:ident, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $name {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0, rhs.0))
            }
        }
    };
    (inplace $name:ident, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $name {
            fn $method(&mut self, rhs: Self) {
                std::ops::$trait::$method(&mut self.0, rhs.0)
            }
        }
    };
    (unary $name:ident, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $name {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self(std::ops::$trait::$method(self.0))
            }
        }
    };
}
