use crate::capability::ChannelSpec;

/// One numbered channel of a connected instrument, carrying its limits.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputChannel {
    spec: ChannelSpec,
}

impl OutputChannel {
    pub(crate) fn new(spec: ChannelSpec) -> Self {
        Self { spec }
    }

    /// 1-based channel number (`101` style for logger inputs).
    pub fn number(&self) -> u16 {
        self.spec.number
    }

    /// Limits from the capability profile.
    pub fn spec(&self) -> &ChannelSpec {
        &self.spec
    }
}
