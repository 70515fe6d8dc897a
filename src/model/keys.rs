//! Typed arena keys linking the entities of a loaded dataset.

macro_rules! arena_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            #[must_use]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            #[must_use]
            pub const fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_key!(
    /// Position of a project in `Dataset::projects`.
    ProjectKey
);
arena_key!(
    /// Position of a task in `Dataset::tasks`.
    TaskKey
);
arena_key!(
    /// Position of a comment in `Dataset::comments`.
    CommentKey
);
arena_key!(
    /// Position of an upload in `Dataset::uploads`.
    UploadKey
);
