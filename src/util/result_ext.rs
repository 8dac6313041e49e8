use std::fmt::Display;

pub trait ResultExt<T, E> {
	/// Logs the error, naming the operation that failed, and discards it.
	fn ok_or_log(self, operation: &'static str) -> Option<T>
	where
		E: Display;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
	fn ok_or_log(self, operation: &'static str) -> Option<T>
	where
		E: Display,
	{
		self
			.inspect_err(|error| tracing::error!(%error, "{operation} failed"))
			.ok()
	}
}
