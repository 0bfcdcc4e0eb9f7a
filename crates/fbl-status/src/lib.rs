#![forbid(unsafe_code)]

use core::fmt;
use serde::{Deserialize, Serialize};

/// Outcome code returned by a routine invocation, shared by the reference engine and the routine
/// under test. Codes follow the OpenCL and clBLAS numbering; anything unnamed is kept as `Other`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(into = "i32", from = "i32")]
pub enum StatusCode {
    Success,
    CompilerNotAvailable,
    TempBufferAllocFailure,
    OutOfResources,
    OutOfHostMemory,
    BuildProgramFailure,
    InvalidValue,
    InvalidCommandQueue,
    InvalidMemObject,
    InvalidBinary,
    InvalidBuildOptions,
    InvalidProgram,
    InvalidProgramExecutable,
    InvalidKernelName,
    InvalidKernelDefinition,
    InvalidKernel,
    InvalidArgIndex,
    InvalidArgValue,
    InvalidArgSize,
    InvalidKernelArgs,
    InvalidLocalNumDimensions,
    InvalidLocalThreadsTotal,
    InvalidLocalThreadsDim,
    InvalidGlobalOffset,
    InvalidEventWaitList,
    InvalidEvent,
    InvalidOperation,
    InvalidBufferSize,
    InvalidGlobalWorkSize,
    NotImplemented,
    InvalidMatrixA,
    InvalidMatrixB,
    InvalidMatrixC,
    InvalidVectorX,
    InvalidVectorY,
    InvalidDimension,
    InvalidLeadDimA,
    InvalidLeadDimB,
    InvalidLeadDimC,
    InvalidIncrementX,
    InvalidIncrementY,
    InsufficientMemoryA,
    InsufficientMemoryB,
    InsufficientMemoryC,
    InsufficientMemoryX,
    InsufficientMemoryY,
    KernelLaunchError,
    KernelRunError,
    InvalidLocalMemUsage,
    NoHalfPrecision,
    NoDoublePrecision,
    InvalidVectorDot,
    InsufficientMemoryDot,
    Other(i32),
}

const NAMED_CODES: [(StatusCode, i32); 53] = [
    (StatusCode::Success, 0),
    (StatusCode::CompilerNotAvailable, -3),
    (StatusCode::TempBufferAllocFailure, -4),
    (StatusCode::OutOfResources, -5),
    (StatusCode::OutOfHostMemory, -6),
    (StatusCode::BuildProgramFailure, -11),
    (StatusCode::InvalidValue, -30),
    (StatusCode::InvalidCommandQueue, -36),
    (StatusCode::InvalidMemObject, -38),
    (StatusCode::InvalidBinary, -42),
    (StatusCode::InvalidBuildOptions, -43),
    (StatusCode::InvalidProgram, -44),
    (StatusCode::InvalidProgramExecutable, -45),
    (StatusCode::InvalidKernelName, -46),
    (StatusCode::InvalidKernelDefinition, -47),
    (StatusCode::InvalidKernel, -48),
    (StatusCode::InvalidArgIndex, -49),
    (StatusCode::InvalidArgValue, -50),
    (StatusCode::InvalidArgSize, -51),
    (StatusCode::InvalidKernelArgs, -52),
    (StatusCode::InvalidLocalNumDimensions, -53),
    (StatusCode::InvalidLocalThreadsTotal, -54),
    (StatusCode::InvalidLocalThreadsDim, -55),
    (StatusCode::InvalidGlobalOffset, -56),
    (StatusCode::InvalidEventWaitList, -57),
    (StatusCode::InvalidEvent, -58),
    (StatusCode::InvalidOperation, -59),
    (StatusCode::InvalidBufferSize, -61),
    (StatusCode::InvalidGlobalWorkSize, -63),
    (StatusCode::NotImplemented, -1024),
    (StatusCode::InvalidMatrixA, -1022),
    (StatusCode::InvalidMatrixB, -1021),
    (StatusCode::InvalidMatrixC, -1020),
    (StatusCode::InvalidVectorX, -1019),
    (StatusCode::InvalidVectorY, -1018),
    (StatusCode::InvalidDimension, -1017),
    (StatusCode::InvalidLeadDimA, -1016),
    (StatusCode::InvalidLeadDimB, -1015),
    (StatusCode::InvalidLeadDimC, -1014),
    (StatusCode::InvalidIncrementX, -1013),
    (StatusCode::InvalidIncrementY, -1012),
    (StatusCode::InsufficientMemoryA, -1011),
    (StatusCode::InsufficientMemoryB, -1010),
    (StatusCode::InsufficientMemoryC, -1009),
    (StatusCode::InsufficientMemoryX, -1008),
    (StatusCode::InsufficientMemoryY, -1007),
    (StatusCode::KernelLaunchError, -2048),
    (StatusCode::KernelRunError, -2047),
    (StatusCode::InvalidLocalMemUsage, -2046),
    (StatusCode::NoHalfPrecision, -2045),
    (StatusCode::NoDoublePrecision, -2044),
    (StatusCode::InvalidVectorDot, -2043),
    (StatusCode::InsufficientMemoryDot, -2042),
];

impl StatusCode {
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        NAMED_CODES
            .iter()
            .find(|(_, value)| *value == code)
            .map_or(Self::Other(code), |(status, _)| *status)
    }

    #[must_use]
    pub fn code(self) -> i32 {
        if let Self::Other(code) = self {
            return code;
        }
        let variant = core::mem::discriminant(&self);
        NAMED_CODES
            .iter()
            .find(|(status, _)| core::mem::discriminant(status) == variant)
            .map_or(i32::MIN, |(_, value)| *value)
    }

    /// Maps `Other` codes that have a name onto the named variant.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::from_code(self.code())
    }

    /// The device cannot run this precision at all.
    #[must_use]
    pub fn is_unsupported_precision(self) -> bool {
        matches!(
            self.normalized(),
            Self::NoDoublePrecision | Self::NoHalfPrecision
        )
    }

    /// The kernel could not be built, or the routine has no implementation yet.
    #[must_use]
    pub fn is_compilation_skip(self) -> bool {
        matches!(
            self.normalized(),
            Self::BuildProgramFailure | Self::NotImplemented
        )
    }
}

impl PartialEq for StatusCode {
    fn eq(&self, other: &Self) -> bool {
        self.code() == other.code()
    }
}

impl Eq for StatusCode {}

impl core::hash::Hash for StatusCode {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.code().hash(state);
    }
}

impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<StatusCode> for i32 {
    fn from(status: StatusCode) -> Self {
        status.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
