/// One parsed FASTA entry.
///
/// Fields hold the bytes of the input unchanged, so that any encoding in
/// headers or sequences passes through a split untouched. Every sequence
/// byte counts as one residue.
#[derive(Debug, PartialEq, Eq, Clone, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub name: Vec<u8>,
    pub description: Vec<u8>,
    pub sequence: Vec<u8>,
}
impl Record {
    pub fn new<N, D, S>(name: N, description: D, sequence: S) -> Self
    where
        N: Into<Vec<u8>>,
        D: Into<Vec<u8>>,
        S: Into<Vec<u8>>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            sequence: sequence.into(),
        }
    }
    /// Number of residues in the sequence.
    pub fn residues(&self) -> u64 {
        self.sequence.len() as u64
    }
}
