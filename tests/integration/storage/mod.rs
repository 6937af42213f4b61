mod attendance_store_tests;
