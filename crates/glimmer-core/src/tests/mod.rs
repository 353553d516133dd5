/*! Unit coverage for the IR data model and builders.
 *
 * These build small functions by hand, without the lowering, and check the
 * block discipline, value typing and CFG queries directly.
 */

mod type_tests;
