// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with value objects, commands,
// errors, the aggregate itself, its repository and its command handler.
//
// This layer knows storage only through the `Repository` contract.
//
// ============================================================================

pub mod order;
