/// Shared execution classes used for worker scheduling and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Background async work whose result may be superseded before it lands.
	Background,
	/// CPU-intensive blocking work (sorting, merging, bounds scans).
	CpuBlocking,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Background => "background",
			Self::CpuBlocking => "cpu_blocking",
		}
	}
}
