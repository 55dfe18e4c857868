/// Envelope for asynchronous results handed to presentation code.
///
/// `Error` may carry the last known-good payload so that a failed refresh can
/// still be rendered with stale content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource<T> {
    Loading(bool),
    Success(T),
    Error { message: String, data: Option<T> },
}

impl<T> Resource<T> {
    pub fn error(message: impl Into<String>, data: Option<T>) -> Self {
        Resource::Error {
            message: message.into(),
            data,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            Resource::Error { data, .. } => data.as_ref(),
            Resource::Loading(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_accessor() {
        assert_eq!(Resource::Success(3).data(), Some(&3));
        assert_eq!(Resource::error("x", Some(4)).data(), Some(&4));
        assert_eq!(Resource::<i32>::error("x", None).data(), None);
        assert_eq!(Resource::<i32>::Loading(true).data(), None);
    }
}
