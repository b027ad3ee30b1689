/// Integer map coordinate.
///
/// Road endpoints, rectangle corners and the growth reference point all
/// live on the same integer pixel grid, so translation is plain
/// `IVec2` addition and subtraction.
pub type Point = glam::IVec2;

/// Scheduling priority of a candidate road. Lower values grow first.
pub type BranchDelay = i32;
